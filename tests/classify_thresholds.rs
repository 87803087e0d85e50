use jobwatch::{
    classify::{classify, JobStatus, Thresholds},
    parser::{EventKind, JobEvent},
};
use time::{macros::datetime, Duration};

fn job_lasting(pid: &str, d: Duration) -> JobEvent {
    let start = datetime!(2025-07-01 12:00:00);
    let mut job = JobEvent::new(pid, format!("Job {pid}"));
    job.set_time(EventKind::Start, start);
    job.set_time(EventKind::End, start + d);
    job
}

fn status_of(d: Duration) -> JobStatus {
    classify(&Thresholds::default(), &job_lasting("1", d)).status
}

#[test]
fn bands_follow_thresholds() {
    assert_eq!(status_of(Duration::minutes(4)), JobStatus::Ok);
    assert_eq!(status_of(Duration::minutes(6)), JobStatus::Warning);
    assert_eq!(status_of(Duration::minutes(11)), JobStatus::Error);
}

#[test]
fn boundaries_are_strict() {
    assert_eq!(status_of(Duration::minutes(5)), JobStatus::Ok);
    assert_eq!(status_of(Duration::minutes(5) + Duration::SECOND), JobStatus::Warning);
    assert_eq!(status_of(Duration::minutes(10)), JobStatus::Warning);
    assert_eq!(status_of(Duration::minutes(10) + Duration::SECOND), JobStatus::Error);
}

#[test]
fn negative_duration_is_ok() {
    assert_eq!(status_of(Duration::minutes(-3)), JobStatus::Ok);
}

#[test]
fn missing_end_is_incomplete() {
    let mut job = JobEvent::new("4", "D");
    job.set_time(EventKind::Start, datetime!(2025-07-01 12:00:00));
    let c = classify(&Thresholds::default(), &job);
    assert_eq!(c.status, JobStatus::Incomplete);
    assert!(c.duration.is_none());
    assert_eq!(c.message, "Incomplete job for PID 4 (D)");
}

#[test]
fn messages_name_the_exceeded_threshold() {
    let t = Thresholds::from_minutes(5, 10);
    let warn = classify(&t, &job_lasting("1002", Duration::minutes(11) - Duration::minutes(4)));
    assert_eq!(warn.message, "Job PID 1002 (Job 1002) took 0:07:00 [WARNING: >5 minutes]");

    let err = classify(&t, &job_lasting("1003", Duration::minutes(21)));
    assert_eq!(err.message, "Job PID 1003 (Job 1003) took 0:21:00 [ERROR: >10 minutes]");

    let ok = classify(&t, &job_lasting("1001", Duration::minutes(6) - Duration::minutes(1)));
    assert_eq!(ok.message, "Job PID 1001 (Job 1001) took 0:05:00");
}

#[test]
fn unordered_thresholds_still_check_error_first() {
    let t = Thresholds::from_minutes(10, 5);
    assert!(!t.is_ordered());
    let c = classify(&t, &job_lasting("1", Duration::minutes(7)));
    assert_eq!(c.status, JobStatus::Error);
}

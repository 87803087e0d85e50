use jobwatch::{
    classify::{classify, Thresholds},
    parser::{EventKind, JobEvent},
    timestamp::parse_datetime,
};
use std::io::Write;
use std::sync::{Arc, Mutex};
use time::{macros::datetime, Duration};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber installed and return everything it logged.
fn capture(f: impl FnOnce()) -> String {
    let buf = Captured::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::TRACE)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buf.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

/// Level token of the first line containing `needle`.
fn level_of<'a>(out: &'a str, needle: &str) -> &'a str {
    out.lines()
        .find(|l| l.contains(needle))
        .and_then(|l| l.split_whitespace().next())
        .unwrap_or_else(|| panic!("no log line containing {needle:?} in:\n{out}"))
}

fn job(pid: &str, minutes: Option<i64>) -> JobEvent {
    let start = datetime!(2025-07-01 12:00:00);
    let mut job = JobEvent::new(pid, "Job");
    job.set_time(EventKind::Start, start);
    if let Some(m) = minutes {
        job.set_time(EventKind::End, start + Duration::minutes(m));
    }
    job
}

#[test]
fn each_status_logs_at_its_level() {
    let t = Thresholds::from_minutes(5, 10);
    let out = capture(|| {
        classify(&t, &job("ok", Some(4)));
        classify(&t, &job("slow", Some(6)));
        classify(&t, &job("late", Some(11)));
        classify(&t, &job("open", None));
    });

    assert_eq!(level_of(&out, "PID ok "), "INFO");
    assert_eq!(level_of(&out, "PID slow "), "WARN");
    assert_eq!(level_of(&out, "PID late "), "ERROR");
    assert_eq!(level_of(&out, "PID open "), "WARN");
}

#[test]
fn unrecognized_timestamp_logs_a_warning() {
    let out = capture(|| {
        assert!(parse_datetime("notadate", None).is_none());
    });
    assert_eq!(level_of(&out, "unrecognized datetime format: notadate"), "WARN");
}

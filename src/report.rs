use crate::{
    classify::{classify, JobStatus, Thresholds},
    parser::JobMap,
    util::format_iso,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub pid: String,
    pub description: String,
    /// ISO-8601, `YYYY-MM-DDTHH:MM:SS`.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration_seconds: Option<f64>,
    pub status: JobStatus,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub ok: usize,
    pub warning: usize,
    pub error: usize,
    pub incomplete: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: JobStatus) {
        match status {
            JobStatus::Ok => self.ok += 1,
            JobStatus::Warning => self.warning += 1,
            JobStatus::Error => self.error += 1,
            JobStatus::Incomplete => self.incomplete += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.ok + self.warning + self.error + self.incomplete
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub warning_minutes: i64,
    pub error_minutes: i64,
    pub counts: StatusCounts,
    pub entries: Vec<ReportEntry>,
}

/// Classify every job, in map order.
pub fn build_report(jobs: &JobMap, thresholds: &Thresholds) -> JobReport {
    let mut counts = StatusCounts::default();
    let entries = jobs
        .iter()
        .map(|job| {
            let c = classify(thresholds, job);
            counts.record(c.status);
            ReportEntry {
                pid: job.pid.clone(),
                description: job.description.clone(),
                start_time: job.start_time.map(format_iso),
                end_time: job.end_time.map(format_iso),
                duration_seconds: c.duration.map(|d| d.as_seconds_f64()),
                status: c.status,
                message: c.message,
            }
        })
        .collect();

    JobReport {
        warning_minutes: thresholds.warning.whole_minutes(),
        error_minutes: thresholds.error.whole_minutes(),
        counts,
        entries,
    }
}

use crate::{parser::JobEvent, util::format_hms};
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Ok,
    Warning,
    Error,
    Incomplete,
}

impl JobStatus {
    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Ok => "OK",
            JobStatus::Warning => "WARNING",
            JobStatus::Error => "ERROR",
            JobStatus::Incomplete => "INCOMPLETE",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Warning/error limits for one run. `error >= warning` is expected, not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub warning: Duration,
    pub error: Duration,
}

impl Thresholds {
    pub fn from_minutes(warning: u32, error: u32) -> Self {
        Self {
            warning: Duration::minutes(warning.into()),
            error: Duration::minutes(error.into()),
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.error >= self.warning
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_minutes(5, 10)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: JobStatus,
    pub duration: Option<Duration>,
    pub message: String,
}

/// Assign a band to one job and log it at the matching level.
///
/// Bands are checked incomplete, error, warning, ok; both comparisons are
/// strict, so a duration equal to a threshold stays in the lower band.
pub fn classify(thresholds: &Thresholds, job: &JobEvent) -> Classification {
    let duration = job.duration();
    let (pid, desc) = (&job.pid, &job.description);

    let (status, message) = match duration {
        None => (
            JobStatus::Incomplete,
            format!("Incomplete job for PID {pid} ({desc})"),
        ),
        Some(d) if d > thresholds.error => (
            JobStatus::Error,
            format!(
                "Job PID {pid} ({desc}) took {} [ERROR: >{} minutes]",
                format_hms(d),
                thresholds.error.whole_minutes()
            ),
        ),
        Some(d) if d > thresholds.warning => (
            JobStatus::Warning,
            format!(
                "Job PID {pid} ({desc}) took {} [WARNING: >{} minutes]",
                format_hms(d),
                thresholds.warning.whole_minutes()
            ),
        ),
        Some(d) => (
            JobStatus::Ok,
            format!("Job PID {pid} ({desc}) took {}", format_hms(d)),
        ),
    };

    match status {
        JobStatus::Incomplete | JobStatus::Warning => warn!("{message}"),
        JobStatus::Error => error!("{message}"),
        JobStatus::Ok => info!("{message}"),
    }

    Classification {
        status,
        duration,
        message,
    }
}

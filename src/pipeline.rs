use crate::{
    classify::Thresholds,
    config::Config,
    export::{self, ExportFormat},
    parser::{self, ParseIssue},
    report::{self, JobReport},
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub struct Pipeline {
    thresholds: Thresholds,
    export: Option<(PathBuf, ExportFormat)>,
}

pub struct JobOutput {
    pub report: JobReport,
    pub issues: Vec<ParseIssue>,
    pub records_read: u64,
    /// Path written, when an export was requested and succeeded.
    pub exported_to: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(cfg: &Config) -> Self {
        let thresholds = cfg.thresholds();
        if !thresholds.is_ordered() {
            warn!(
                "error threshold ({} min) is below warning threshold ({} min)",
                cfg.thresholds.error_minutes, cfg.thresholds.warning_minutes
            );
        }
        Self {
            thresholds,
            export: cfg.export_path().map(|p| (p, cfg.export.format)),
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Parse, classify, then export if configured. Parse problems and export
    /// failures are logged and never abort the run.
    pub fn run_job(&self, input: &Path) -> JobOutput {
        let started = Instant::now();

        let parsed = parser::parse_path(input);
        debug!(
            "fallback_date={:?} issues={}",
            parsed.fallback_date,
            parsed.issues.len()
        );

        let report = report::build_report(&parsed.jobs, &self.thresholds);
        info!(
            "classified {} jobs: ok={} warning={} error={} incomplete={}",
            report.counts.total(),
            report.counts.ok,
            report.counts.warning,
            report.counts.error,
            report.counts.incomplete
        );

        let exported_to = self.export.as_ref().and_then(|(path, format)| {
            match export::export_report(&report.entries, path, *format) {
                Ok(n) => {
                    info!("Report exported to {} ({format}, {n} entries)", path.display());
                    Some(path.clone())
                }
                Err(e) => {
                    error!("{e}");
                    None
                }
            }
        });

        debug!("run finished in {:?}", started.elapsed());

        JobOutput {
            report,
            issues: parsed.issues,
            records_read: parsed.records_read,
            exported_to,
        }
    }
}

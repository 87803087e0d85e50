use jobwatch::{classify::JobStatus, config::Config, pipeline::Pipeline};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn runs_end_to_end_and_exports_csv() {
    let dir = tempfile::tempdir().unwrap();
    let export = dir.path().join("report.csv");

    let mut cfg = Config::default();
    cfg.export.path = export.display().to_string();
    let out = Pipeline::new(&cfg).run_job(&fixture("mixed.log"));

    assert_eq!(out.records_read, 7);
    assert_eq!(out.issues.len(), 2);
    assert_eq!(out.report.counts.ok, 0);
    assert_eq!(out.report.counts.warning, 1);
    assert_eq!(out.report.counts.error, 1);
    assert_eq!(out.report.counts.incomplete, 1);
    assert_eq!(out.exported_to.as_deref(), Some(export.as_path()));

    let csv = std::fs::read_to_string(&export).unwrap();
    assert_eq!(csv.lines().count(), 4);
}

#[test]
fn thresholds_from_config_change_bands() {
    let mut cfg = Config::default();
    cfg.thresholds.warning_minutes = 1;
    cfg.thresholds.error_minutes = 6;
    let out = Pipeline::new(&cfg).run_job(&fixture("mixed.log"));
    let statuses: Vec<JobStatus> = out.report.entries.iter().map(|e| e.status).collect();
    assert_eq!(statuses, [JobStatus::Warning, JobStatus::Error, JobStatus::Incomplete]);
}

#[test]
fn missing_log_gives_empty_report() {
    let cfg = Config::default();
    let out = Pipeline::new(&cfg).run_job(&fixture("does-not-exist.log"));
    assert!(out.report.entries.is_empty());
    assert!(out.exported_to.is_none());
}

#[test]
fn failed_export_keeps_report() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();

    let mut cfg = Config::default();
    cfg.export.path = blocker.join("report.json").display().to_string();
    let out = Pipeline::new(&cfg).run_job(&fixture("mixed.log"));
    assert!(out.exported_to.is_none());
    assert_eq!(out.report.entries.len(), 3);
}

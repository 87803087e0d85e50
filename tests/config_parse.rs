use jobwatch::{config::Config, export::ExportFormat};
use time::Duration;

#[test]
fn parse_example_config() {
    let raw = include_str!("../jobwatch.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.thresholds.warning_minutes, 5);
    assert_eq!(cfg.thresholds.error_minutes, 10);
    assert!(cfg.export_path().is_none());
    assert!(!cfg.input.log_file.is_empty());
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: Config = toml::from_str("[export]\npath = \"out/report.json\"\nformat = \"json\"\n").unwrap();
    assert_eq!(cfg.export.format, ExportFormat::Json);
    assert_eq!(cfg.thresholds().error, Duration::minutes(10));
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn unknown_export_format_is_rejected() {
    let res: Result<Config, _> = toml::from_str("[export]\npath = \"x\"\nformat = \"xml\"\n");
    assert!(res.is_err());
}

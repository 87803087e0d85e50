use crate::{classify::Thresholds, export::ExportFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: Input,
    #[serde(default)]
    pub thresholds: ThresholdMinutes,
    #[serde(default)]
    pub export: Export,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub debug: Debug,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds::from_minutes(self.thresholds.warning_minutes, self.thresholds.error_minutes)
    }

    /// Export target, if one is configured.
    pub fn export_path(&self) -> Option<PathBuf> {
        if self.export.path.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.export.path))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Input {
    pub log_file: String,
}
impl Default for Input {
    fn default() -> Self {
        Self {
            log_file: "logs.log".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdMinutes {
    pub warning_minutes: u32,
    pub error_minutes: u32,
}
impl Default for ThresholdMinutes {
    fn default() -> Self {
        Self {
            warning_minutes: 5,
            error_minutes: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Export {
    /// Empty disables export.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub print_summary: bool,
    pub print_entries: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            print_summary: true,
            print_entries: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Debug {
    pub dump_effective_config: bool,
}

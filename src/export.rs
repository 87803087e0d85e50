use crate::report::ReportEntry;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CSV_HEADER: [&str; 7] = [
    "pid",
    "description",
    "start_time",
    "end_time",
    "duration_seconds",
    "status",
    "message",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => f.write_str("csv"),
            ExportFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to export report to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write CSV report {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write JSON report {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Write entries as CSV with a header row. Absent values are empty cells.
pub fn export_csv<W: Write>(entries: &[ReportEntry], writer: W, path: &Path) -> Result<usize, ExportError> {
    let csv_err = |source: csv::Error| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(CSV_HEADER).map_err(csv_err)?;

    for e in entries {
        let duration = e
            .duration_seconds
            .map(|d| format!("{d:.1}"))
            .unwrap_or_default();
        w.write_record([
            e.pid.as_str(),
            e.description.as_str(),
            e.start_time.as_deref().unwrap_or(""),
            e.end_time.as_deref().unwrap_or(""),
            duration.as_str(),
            e.status.label(),
            e.message.as_str(),
        ])
        .map_err(csv_err)?;
    }

    w.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(entries.len())
}

/// Write entries as a pretty-printed JSON array; absent values are `null`.
pub fn export_json<W: Write>(entries: &[ReportEntry], writer: W, path: &Path) -> Result<usize, ExportError> {
    let mut writer = writer;
    serde_json::to_writer_pretty(&mut writer, entries).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(entries.len())
}

/// Create `path` (and its parent directory) and write the report in `format`.
pub fn export_report(entries: &[ReportEntry], path: &Path, format: ExportFormat) -> Result<usize, ExportError> {
    let io_err = |source: std::io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = BufWriter::new(File::create(path).map_err(io_err)?);
    match format {
        ExportFormat::Csv => export_csv(entries, file, path),
        ExportFormat::Json => export_json(entries, file, path),
    }
}

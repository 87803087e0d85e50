use crate::{config::Config, export::ExportFormat, parser, pipeline::Pipeline, util::ensure_dir};
use anyhow::{anyhow, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "jobwatch")]
#[command(about = "Pair START/END job events from a CSV log and flag slow or unfinished jobs")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./jobwatch.toml if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse, classify and optionally export the report.
    Report {
        #[command(flatten)]
        input: InputArgs,
        /// Warning threshold in minutes.
        #[arg(long)]
        warning: Option<u32>,
        /// Error threshold in minutes.
        #[arg(long)]
        error: Option<u32>,
        /// Export report to file (CSV or JSON).
        #[arg(long)]
        export: Option<PathBuf>,
        /// Export format.
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
    },
    /// Parse only and print the paired jobs as JSON.
    Jobs {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print the effective configuration.
    CheckConfig {},
}

#[derive(ClapArgs, Debug)]
pub struct InputArgs {
    /// Path to log file (CSV).
    #[arg(long)]
    pub logfile: Option<PathBuf>,
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let mut cfg = match &cfg_path {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };

    match &args.cmd {
        Command::Report {
            input,
            warning,
            error,
            export,
            format,
        } => {
            apply_input(&mut cfg, input);
            if let Some(w) = warning {
                cfg.thresholds.warning_minutes = *w;
            }
            if let Some(e) = error {
                cfg.thresholds.error_minutes = *e;
            }
            if let Some(p) = export {
                cfg.export.path = p.display().to_string();
            }
            if let Some(f) = format {
                cfg.export.format = *f;
            }
            let _guard = init_logging(&args, &cfg)?;
            log_effective_config(&cfg, cfg_path.as_deref());
            report(&cfg)
        }
        Command::Jobs { input } => {
            apply_input(&mut cfg, input);
            let _guard = init_logging(&args, &cfg)?;
            log_effective_config(&cfg, cfg_path.as_deref());
            jobs(&cfg)
        }
        Command::CheckConfig {} => {
            println!("{}", toml::to_string(&cfg)?);
            Ok(())
        }
    }
}

fn apply_input(cfg: &mut Config, input: &InputArgs) {
    if let Some(p) = &input.logfile {
        cfg.input.log_file = p.display().to_string();
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("jobwatch.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = resolve_log_path(cfg) {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(&path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from("jobwatch.log"));
    }
    Some(PathBuf::from(&cfg.logging.file_path))
}

fn log_effective_config(cfg: &Config, from: Option<&Path>) {
    if !cfg.debug.dump_effective_config {
        return;
    }
    let source = from
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".into());
    let raw = toml::to_string(cfg).unwrap_or_default();
    debug!("effective config (from {source}):\n{raw}");
}

fn report(cfg: &Config) -> Result<()> {
    let input = PathBuf::from(&cfg.input.log_file);
    let pipeline = Pipeline::new(cfg);
    let out = pipeline.run_job(&input);

    if cfg.output.print_summary {
        let mut summary = serde_json::json!({
            "log_file": input,
            "records_read": out.records_read,
            "issues": out.issues.len(),
            "warning_minutes": out.report.warning_minutes,
            "error_minutes": out.report.error_minutes,
            "counts": out.report.counts,
            "exported_to": out.exported_to,
        });
        if cfg.output.print_entries {
            summary["entries"] = serde_json::to_value(&out.report.entries)?;
        }
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

fn jobs(cfg: &Config) -> Result<()> {
    let jobs = parser::parse_log_file(Path::new(&cfg.input.log_file));
    println!("{}", serde_json::to_string_pretty(&jobs)?);
    Ok(())
}

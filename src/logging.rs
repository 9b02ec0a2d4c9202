//! Logging setup for a training run.
//!
//! Events go to stderr and to a run log written next to the model artifact,
//! so every saved model has the log of the run that produced it.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

const RUN_LOG_SUFFIX: &str = "train.log";

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create log file at {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// Run log for the artifact at `model_out`: `<dir>/<stem>.train.log`.
pub fn run_log_path(model_out: &Path) -> PathBuf {
    let stem = model_out
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("workout_model");
    model_out.with_file_name(format!("{stem}.{RUN_LOG_SUFFIX}"))
}

/// Install the global subscriber, logging to stderr and to `log_path`.
///
/// The log file is truncated so it only holds the current run. Keep the
/// returned guard alive until the run ends or buffered lines are lost.
pub fn init(log_path: &Path) -> Result<WorkerGuard, LoggingError> {
    let file = open_run_log(log_path)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    let timer = build_timer();
    let console_layer = fmt::layer()
        .with_timer(timer.clone())
        .with_target(false)
        .with_writer(std::io::stderr);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(file_writer);

    let subscriber = Registry::default()
        .with(build_env_filter())
        .with(console_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;

    tracing::debug!(
        "Run started {}; log file at {}",
        now_local_or_utc(),
        log_path.display()
    );
    Ok(guard)
}

fn open_run_log(path: &Path) -> Result<File, LoggingError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| LoggingError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    File::create(path).map_err(|source| LoggingError::CreateLogFile {
        path: path.to_path_buf(),
        source,
    })
}

fn build_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, DISPLAY_FORMAT.into())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

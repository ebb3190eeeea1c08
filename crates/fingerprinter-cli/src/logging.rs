use std::env;
use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Stdout plus a plain log file. Keep the guard alive until exit or the file
/// writer drops buffered lines. When the log file cannot be opened, logging
/// continues on stdout only and no guard is returned.
pub fn init_logger() -> Option<WorkerGuard> {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::new(filter);

    let log_file_path =
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| "./logs/fingerprinter.log".to_string());

    let (file_layer, guard, file_error) = match file_appender(Path::new(&log_file_path)) {
        Ok(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard), None)
        }
        Err(err) => (None, None, Some(err)),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .pretty()
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(file_layer)
        .with(filter_layer)
        .init();

    match file_error {
        Some(err) => warn!("File logging disabled: {:#}", err),
        None => debug!("Tracing is configured for stdout and file logging."),
    }

    guard
}

fn file_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .with_context(|| format!("Log path {} has no file name", path.display()))?;

    fs::create_dir_all(dir)
        .with_context(|| format!("Unable to create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("Unable to open log file {}", path.display()))
}

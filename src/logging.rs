// Logging init: console plus an append-only log file

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the file writer alive; dropping it flushes pending lines
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stdout and append to `log_path`.
///
/// If the file cannot be opened the error is reported on stderr and logging
/// continues on the console only.
pub fn init(log_path: &Path) -> anyhow::Result<LogGuard> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stdout);

    let (file_layer, guard) = match open_log_file(log_path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", log_path.display(), e);
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(LogGuard { _file: guard })
}

fn open_log_file(log_path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
}

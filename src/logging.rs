//! Subscriber setup for the binaries.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{MazeError, Result};

/// Installs the global subscriber: human-readable events on stderr and, when
/// `log_file` is given, the same events appended to that file without ANSI
/// colors.
///
/// `RUST_LOG` overrides `level` when set. Keep the returned guard alive until
/// exit, dropping it flushes the file writer.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| MazeError::invalid(format!("bad log filter '{level}': {e}")))?;

    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| MazeError::invalid(format!("logging already initialized: {e}")))?;
    Ok(guard)
}

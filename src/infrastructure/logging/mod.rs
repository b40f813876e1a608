// Logging module - Logging infrastructure
use crate::domain::error::{CutermError, CutermResult};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
fn default_filter(level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { level };
    format!("cuterm={}", level)
}

/// Initialize logging system.
///
/// Diagnostics go to stderr unless a log file is given. The terminal is in
/// raw mode while relaying, so the default level keeps stderr quiet.
pub fn init_logging(level: &str, verbose: bool, log_file: Option<&Path>) -> CutermResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level, verbose)));

    let (writer, ansi) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| CutermError::Config {
                    message: format!("Failed to open log file {}: {}", path.display(), e),
                })?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(io::stderr), true),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true)
                .with_level(true),
        )
        .try_init()
        .map_err(|e| CutermError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::debug!("cuterm logging system initialized");
    Ok(())
}

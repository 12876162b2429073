use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, fmt::time::LocalTime, prelude::*, EnvFilter};

use crate::error::{Result, ScraperError};

/// Initializes logging with a human console layer and a JSON file layer.
///
/// The file layer rolls daily under `log_dir`. `RUST_LOG` wins over `level` when set.
/// Keep the returned guard alive for the life of the process or buffered lines are lost.
pub fn init_logging(log_dir: &Path, level: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "harvest.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer()
        .with_timer(LocalTime::rfc_3339())
        .with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter(level)?)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| ScraperError::Config(format!("Failed to install tracing subscriber: {e}")))?;

    Ok(guard)
}

fn env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = format!("project_harvest={level}")
        .parse()
        .map_err(|e| ScraperError::Config(format!("Invalid log level '{level}': {e}")))?;
    Ok(EnvFilter::new("warn").add_directive(directive))
}

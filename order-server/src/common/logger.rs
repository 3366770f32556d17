//! Logging Infrastructure
//!
//! Structured logging setup for development and production:
//! console output always, plus a daily rotating file when a log directory
//! is configured. Production uses JSON format for the file layer.

use std::fs;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system.
///
/// # Arguments
/// * `level` - default log level when `RUST_LOG` is not set
/// * `json_format` - JSON file output (production) vs plain text
/// * `log_dir` - optional directory for the rotating file appender
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer());

    match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "order-server.log");
            if json_format {
                registry
                    .with(fmt::layer().with_ansi(false).json().with_writer(appender))
                    .init();
            } else {
                registry
                    .with(fmt::layer().with_ansi(false).with_writer(appender))
                    .init();
            }
            tracing::info!(log_dir = %dir, "File logging enabled (daily rotation)");
        }
        None => registry.init(),
    }

    Ok(())
}

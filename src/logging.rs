//! Logging setup for the command-line tool
//!
//! The library only emits `tracing` events; whoever embeds it decides where
//! they go. The CLI sends them to stderr and, when configured, to a daily
//! rolling file.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::result::{AppError, Result};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level used when `RUST_LOG` is not set; `None` disables logging
    pub level: Option<Level>,
    /// Directory for the log file
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: Some(Level::WARN), log_dir: None }
    }
}

impl LoggingConfig {
    /// Build from the configured level name, `-v` count and log directory
    pub fn new(level: Option<&str>, verbosity: u8, log_dir: Option<PathBuf>) -> Self {
        let level = match level.map(str::to_ascii_lowercase).as_deref() {
            Some("off") => None,
            Some(name) => name.parse().ok().or(Some(Level::WARN)),
            None => Some(Level::WARN),
        };

        let level = level.map(|base| match verbosity {
            0 => base,
            1 => base.max(Level::INFO),
            2 => base.max(Level::DEBUG),
            _ => Level::TRACE,
        });

        Self { level, log_dir }
    }

    fn filter(&self) -> EnvFilter {
        match self.level {
            Some(level) => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    EnvFilter::new(format!("gitlab_rest={}", level.as_str().to_ascii_lowercase()))
                }),
            None => EnvFilter::new("off"),
        }
    }
}

/// Install the global subscriber; keep the guard alive until exit
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "gitlab-rest.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(config.filter())
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::LoggingError(e.to_string().into()))?;

    Ok(guard)
}

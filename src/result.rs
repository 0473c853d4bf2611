use std::path::PathBuf;

use compact_str::CompactString;
use thiserror::Error;

use crate::client::ClientError;

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors of the command-line layer
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to load configuration from: {path}")]
    ConfigLoadError { path: PathBuf, message: String },

    #[error("Failed to save configuration to: {path}")]
    ConfigSaveError { path: PathBuf, message: String },

    #[error("Invalid configuration: {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Failed to initialize logging: {0}")]
    LoggingError(CompactString),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl AppError {
    /// Create a configuration load error
    pub fn config_load_error(path: PathBuf, source: impl std::fmt::Display) -> Self {
        Self::ConfigLoadError { path, message: source.to_string() }
    }

    /// Create a configuration save error
    pub fn config_save_error(path: PathBuf, source: impl std::fmt::Display) -> Self {
        Self::ConfigSaveError { path, message: source.to_string() }
    }

    /// Create a configuration validation error
    pub fn config_validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidationError { field: field.into(), message: message.into() }
    }
}

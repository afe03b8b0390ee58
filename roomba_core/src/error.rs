//! Error types for the roomba core
//!
//! The controller operations themselves never fail. Errors only come from building
//! or loading configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate
pub type RoombaResult<T> = Result<T, RoombaError>;

#[derive(Debug, Error)]
pub enum RoombaError {
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl RoombaError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

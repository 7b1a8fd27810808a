//! Error types for the inventory generator

use thiserror::Error;

/// Main error type for the inventory generator.
///
/// Only failures that must stop the run live here. Director protocol
/// anomalies (unexpected status codes, task timeouts) are reported through
/// [`crate::http::tasks::TaskOutcome`] and degrade to an empty deployment.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TLS error: {0}")]
    TlsError(String),

    #[error("Malformed task result at line {line}: {source}")]
    DecodeError {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl InventoryError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            InventoryError::DecodeError { .. } => 2,
            _ => 1,
        }
    }
}

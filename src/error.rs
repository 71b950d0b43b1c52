//! Error types for Flowscribe

use std::io;
use thiserror::Error;

/// Result type for Flowscribe operations
pub type Result<T> = std::result::Result<T, FlowscribeError>;

/// Errors that can occur while capturing or reading artifacts
#[derive(Debug, Error)]
pub enum FlowscribeError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Record could not be encoded or decoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transaction URL is not an absolute URL with a host
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// File under a capture root is not a recognizable artifact
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    /// Response handler invoked before the engine attached a response
    #[error("Transaction {0} has no response")]
    MissingResponse(String),
}

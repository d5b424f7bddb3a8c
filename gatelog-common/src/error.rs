//! Common error types for gatelog

use thiserror::Error;

/// Common result type for gatelog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across gatelog crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record serialization or deserialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

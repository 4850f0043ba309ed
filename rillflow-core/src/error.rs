//! Error types for rillflow.

use thiserror::Error;

/// Result type for flow operations.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Error types that can occur while assembling or running a flow.
#[derive(Error, Debug)]
pub enum FlowError {
    /// Invalid configuration: bad option values, missing collaborators,
    /// invalid names. Detected during setup; the pipeline does not start.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An actor's effect failed mid-chain. Aborts the remaining chain but
    /// wrap-up still runs on all actors already entered.
    #[error("Execution error: {0}")]
    Execution(String),

    /// String-to-value or value-to-string conversion failed.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Serialization/Deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error.
    #[error("Error: {0}")]
    Other(#[from] eyre::Report),
}

impl FlowError {
    /// Create a new configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new execution error.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create a new conversion error.
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }
}

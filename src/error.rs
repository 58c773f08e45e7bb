//! IoT Privacy error types

use thiserror::Error;

/// IoT Privacy error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Packet does not follow the payload/metadata scalar contract
    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    /// Audit export error
    #[error("Export error: {0}")]
    Export(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for IoT Privacy operations
pub type Result<T> = std::result::Result<T, Error>;

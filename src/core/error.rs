//! Top-level error type for the simulator.

use thiserror::Error;

use crate::client::ClientError;
use crate::config::ConfigError;
use crate::payload::PayloadError;
use crate::transport::TransportError;

/// Top-level watchsim errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Payload generation error.
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    /// Client error.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;

//! Transport layer error types.
//!
//! Every error here is recoverable at the client level: it ends the current
//! lifecycle attempt and the client reconnects after its back-off. Short
//! writes and empty reads are not errors and never show up here.

use std::io;

use thiserror::Error;

/// Transport layer errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be opened or the handshake failed
    /// (refused, unreachable, resource exhaustion).
    #[error("connect failed: {0}")]
    Connect(io::Error),

    /// Hard write failure. A short write is not reported here.
    #[error("write failed: {0}")]
    Write(io::Error),

    /// Hard read failure.
    #[error("read failed: {0}")]
    Read(io::Error),

    /// Waiting for readiness failed.
    #[error("readiness poll failed: {0}")]
    Poll(io::Error),

    /// The peer closed the connection (EOF).
    #[error("peer closed the connection")]
    PeerClosed,

    /// Operation requires an established connection.
    #[error("session is not connected")]
    NotConnected,
}

impl TransportError {
    /// Check if this error happened before the connection was established.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, TransportError::Connect(_))
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

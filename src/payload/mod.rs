//! Payload generation.
//!
//! Builds the two messages a device ever writes:
//!
//! - the login blob, derived only from the device's [`Credential`]
//! - a [`TelemetryRecord`], freshly sampled on every call
//!
//! Both are JSON objects written as raw bytes with no framing. The server has
//! to infer message boundaries from send boundaries.

mod credential;
mod telemetry;

pub use credential::*;
pub use telemetry::*;

use thiserror::Error;

/// Errors while serializing a payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for payload operations.
pub type PayloadResult<T> = Result<T, PayloadError>;

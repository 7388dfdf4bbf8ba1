//! Core constants and error types.
//!
//! The constants are shared by the payload, transport and client layers.
//! [`SimError`] gathers the per-layer errors into one type.

mod constants;
mod error;

pub use constants::*;
pub use error::*;

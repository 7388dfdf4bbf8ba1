//! Client State Machine - one simulated device.
//!
//! Drives a [`Session`](crate::transport::Session) through
//! `Connecting → Authenticating → Streaming`, falling into `Error` on any
//! failure and back to `Connecting` after a back-off. Runs until its
//! [`Shutdown`] fires.

mod backoff;
#[allow(clippy::module_inception)]
mod client;
mod config;
mod events;
mod shutdown;
mod state;

pub use backoff::BackoffPolicy;
pub use client::*;
pub use config::*;
pub use events::*;
pub use shutdown::*;
pub use state::ClientState;

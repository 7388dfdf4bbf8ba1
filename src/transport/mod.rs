//! Transport Session - one non-blocking TCP connection per lifecycle attempt.
//!
//! A session is driven entirely by readiness:
//!
//! 1. [`Connector::open`] creates the socket and starts the connect without
//!    blocking.
//! 2. [`Session::poll_readiness`] makes one bounded pass and reports which of
//!    connect/write/read fired.
//! 3. [`Session::complete_connect`], [`Session::write_bytes`] and
//!    [`Session::read_bytes`] act on what fired.
//! 4. [`Session::close`] tears everything down, and is safe to call twice.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Client State Machine             │
//! ├─────────────────────────────────────────┤
//! │        Transport Session                │  ← This module
//! │   readiness, partial I/O, buffer        │
//! ├─────────────────────────────────────────┤
//! │           tokio TCP                     │
//! └─────────────────────────────────────────┘
//! ```

mod buffer;
mod error;
mod session;
mod socket;

pub use buffer::InboundBuffer;
pub use error::*;
pub use session::*;
pub use socket::*;

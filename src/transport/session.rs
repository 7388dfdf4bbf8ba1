//! Readiness-driven session interface.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{Interest, Ready};

use super::TransportResult;

/// Events that fired during one readiness pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    /// The pending connect has resolved (successfully or not).
    pub connectable: bool,
    /// The socket accepts writes.
    pub writable: bool,
    /// The socket has data or EOF to read.
    pub readable: bool,
}

impl Readiness {
    /// Nothing fired.
    pub const NONE: Self = Self {
        connectable: false,
        writable: false,
        readable: false,
    };

    /// Only connect-ready fired.
    pub const CONNECT: Self = Self {
        connectable: true,
        writable: false,
        readable: false,
    };

    /// Only write-ready fired.
    pub const WRITE: Self = Self {
        connectable: false,
        writable: true,
        readable: false,
    };

    /// Only read-ready fired.
    pub const READ: Self = Self {
        connectable: false,
        writable: false,
        readable: true,
    };

    /// Both write-ready and read-ready fired.
    pub const WRITE_READ: Self = Self {
        connectable: false,
        writable: true,
        readable: true,
    };

    /// Translate a tokio readiness set, restricted to `interest`.
    pub fn from_ready(ready: Ready, interest: Interest) -> Self {
        Self {
            connectable: false,
            writable: interest.is_writable() && ready.is_writable(),
            readable: interest.is_readable() && ready.is_readable(),
        }
    }

    /// Check if nothing fired.
    pub fn is_empty(&self) -> bool {
        !(self.connectable || self.writable || self.readable)
    }
}

/// Outcome of a non-blocking read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes were read; the vector is sized to what arrived.
    Data(Vec<u8>),
    /// Nothing to read right now. The connection is still open.
    NoData,
    /// The peer closed the connection. The caller must tear the session down.
    Eof,
}

/// One outbound connection attempt and its readiness-driven I/O.
///
/// A session is never reused: after a failure or [`Session::close`] the
/// owner discards it and opens a new one.
#[async_trait]
pub trait Session: Send {
    /// Make a single readiness pass, waiting at most `timeout`.
    ///
    /// Never sleeps on its own; a zero timeout makes it a pure check. The
    /// owner calls this repeatedly in its loop.
    async fn poll_readiness(&mut self, timeout: Duration) -> TransportResult<Readiness>;

    /// Finish the TCP handshake after connect-ready fired.
    ///
    /// On success write interest is selected. On failure the session is
    /// already closed and must be discarded.
    fn complete_connect(&mut self) -> TransportResult<()>;

    /// Replace the set of events [`Session::poll_readiness`] reports.
    fn set_interest(&mut self, interest: Interest);

    /// Non-blocking write; returns how many bytes the socket accepted.
    ///
    /// Fewer bytes than requested (including zero) is a legal short write,
    /// not an error. A hard error closes the session.
    fn write_bytes(&mut self, data: &[u8]) -> TransportResult<usize>;

    /// Non-blocking read into the session's inbound buffer.
    fn read_bytes(&mut self) -> TransportResult<ReadOutcome>;

    /// Release the socket. Idempotent.
    fn close(&mut self);

    /// Check if the session has been closed.
    fn is_closed(&self) -> bool;
}

/// Factory for sessions; one call per connect attempt.
pub trait Connector: Send {
    /// Session type produced by this connector.
    type Session: Session;

    /// Create a non-blocking socket and start connecting to `addr`.
    ///
    /// Never blocks. Fails only when the socket cannot be created.
    fn open(&mut self, addr: SocketAddr) -> TransportResult<Self::Session>;
}

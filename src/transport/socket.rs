//! Non-blocking TCP session on top of tokio.
//!
//! [`TcpConnector::open`] creates the socket and arms the connect; the SYN
//! goes out on the first [`Session::poll_readiness`] pass, which is also the
//! only place the handshake is observed. No call in here ever waits longer
//! than the timeout it was given.

use std::fmt;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::Interest;
use tokio::net::{TcpSocket, TcpStream};
use tokio::time;

use super::buffer::InboundBuffer;
use super::session::{Connector, ReadOutcome, Readiness, Session};
use super::{TransportError, TransportResult};
use crate::core::INBOUND_BUFFER_SIZE;

type PendingConnect = Pin<Box<dyn Future<Output = io::Result<TcpStream>> + Send>>;

/// Where a [`TcpSession`] is in its short life.
enum Phase {
    /// Handshake in flight.
    Connecting(PendingConnect),
    /// Handshake resolved; waiting for `complete_connect`.
    Resolved(io::Result<TcpStream>),
    /// Established.
    Connected(TcpStream),
    /// Torn down.
    Closed,
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Connecting(_) => f.write_str("Connecting"),
            Phase::Resolved(Ok(_)) => f.write_str("Resolved(ok)"),
            Phase::Resolved(Err(e)) => write!(f, "Resolved({e})"),
            Phase::Connected(stream) => f.debug_tuple("Connected").field(stream).finish(),
            Phase::Closed => f.write_str("Closed"),
        }
    }
}

/// One outbound TCP connection driven by readiness.
#[derive(Debug)]
pub struct TcpSession {
    /// Remote endpoint.
    peer: SocketAddr,
    /// Connection phase.
    phase: Phase,
    /// Events reported once connected.
    interest: Interest,
    /// Receive buffer, reused across reads.
    inbound: InboundBuffer,
}

impl TcpSession {
    /// Get the remote address this session targets.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Get the local address once connected.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        match &self.phase {
            Phase::Connected(stream) => stream.local_addr(),
            _ => Err(io::Error::from(io::ErrorKind::NotConnected)),
        }
    }

    /// Check if the handshake has completed.
    pub fn is_connected(&self) -> bool {
        matches!(self.phase, Phase::Connected(_))
    }

    fn stream(&self) -> TransportResult<&TcpStream> {
        match &self.phase {
            Phase::Connected(stream) => Ok(stream),
            _ => Err(TransportError::NotConnected),
        }
    }
}

#[async_trait]
impl Session for TcpSession {
    async fn poll_readiness(&mut self, timeout: Duration) -> TransportResult<Readiness> {
        let interest = self.interest;
        match &mut self.phase {
            Phase::Connecting(pending) => {
                let polled = time::timeout(timeout, pending.as_mut()).await;
                match polled {
                    Ok(result) => {
                        self.phase = Phase::Resolved(result);
                        Ok(Readiness::CONNECT)
                    }
                    Err(_) => Ok(Readiness::NONE),
                }
            }
            Phase::Resolved(_) => Ok(Readiness::CONNECT),
            Phase::Connected(stream) => {
                let polled = time::timeout(timeout, stream.ready(interest)).await;
                match polled {
                    Ok(Ok(ready)) => Ok(Readiness::from_ready(ready, interest)),
                    Ok(Err(e)) => {
                        self.close();
                        Err(TransportError::Poll(e))
                    }
                    Err(_) => Ok(Readiness::NONE),
                }
            }
            Phase::Closed => Err(TransportError::NotConnected),
        }
    }

    fn complete_connect(&mut self) -> TransportResult<()> {
        match std::mem::replace(&mut self.phase, Phase::Closed) {
            Phase::Resolved(Ok(stream)) => {
                self.phase = Phase::Connected(stream);
                self.interest = Interest::WRITABLE;
                Ok(())
            }
            Phase::Resolved(Err(e)) => Err(TransportError::Connect(e)),
            phase @ (Phase::Connecting(_) | Phase::Connected(_)) => {
                self.phase = phase;
                Err(TransportError::NotConnected)
            }
            Phase::Closed => Err(TransportError::NotConnected),
        }
    }

    fn set_interest(&mut self, interest: Interest) {
        self.interest = interest;
    }

    fn write_bytes(&mut self, data: &[u8]) -> TransportResult<usize> {
        let result = self.stream()?.try_write(data);
        match result {
            Ok(written) => Ok(written),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => {
                self.close();
                Err(TransportError::Write(e))
            }
        }
    }

    fn read_bytes(&mut self) -> TransportResult<ReadOutcome> {
        let Phase::Connected(stream) = &self.phase else {
            return Err(TransportError::NotConnected);
        };

        let result = stream.try_read(self.inbound.prepare());
        match result {
            Ok(0) => {
                self.close();
                Ok(ReadOutcome::Eof)
            }
            Ok(len) => {
                self.inbound.fill(len);
                Ok(ReadOutcome::Data(self.inbound.take()))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(ReadOutcome::NoData),
            Err(e) => {
                self.close();
                Err(TransportError::Read(e))
            }
        }
    }

    fn close(&mut self) {
        // Dropping the stream or the pending connect deregisters the socket.
        self.phase = Phase::Closed;
    }

    fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Closed)
    }
}

/// Opens [`TcpSession`]s.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    inbound_buffer_size: usize,
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl TcpConnector {
    /// Create a connector with the default inbound buffer size.
    pub fn new() -> Self {
        Self {
            inbound_buffer_size: INBOUND_BUFFER_SIZE,
        }
    }

    /// Set the inbound buffer size of every session opened from now on.
    ///
    /// Clamped to at least one byte.
    pub fn inbound_buffer_size(mut self, size: usize) -> Self {
        self.inbound_buffer_size = size.max(1);
        self
    }
}

impl Connector for TcpConnector {
    type Session = TcpSession;

    fn open(&mut self, addr: SocketAddr) -> TransportResult<TcpSession> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(TransportError::Connect)?;

        Ok(TcpSession {
            peer: addr,
            phase: Phase::Connecting(Box::pin(socket.connect(addr))),
            interest: Interest::WRITABLE,
            inbound: InboundBuffer::new(self.inbound_buffer_size),
        })
    }
}

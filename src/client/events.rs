//! Lifecycle events and the sink they are written to.

use std::net::SocketAddr;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::state::ClientState;

/// Something observable that happened to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A new connection attempt started.
    ConnectAttempt {
        /// Target endpoint.
        addr: SocketAddr,
    },

    /// The TCP handshake completed.
    Connected {
        /// Target endpoint.
        addr: SocketAddr,
    },

    /// The connection could not be established.
    ConnectFailed {
        /// Error description.
        reason: String,
    },

    /// The socket accepted the login message. No reply is expected.
    LoginSent {
        /// The login message as written.
        payload: Vec<u8>,
        /// Bytes the socket accepted.
        written: usize,
    },

    /// The socket accepted nothing; login is retried on the next write-ready.
    LoginDeferred,

    /// One telemetry record was written.
    DataSent {
        /// Bytes the socket accepted.
        written: usize,
        /// Size of the record.
        requested: usize,
    },

    /// Bytes arrived from the server.
    DataReceived {
        /// The bytes read.
        data: Vec<u8>,
    },

    /// An established connection was lost.
    Disconnected {
        /// Error description.
        reason: String,
    },

    /// Backing off before the next attempt.
    Reconnecting {
        /// Retry counter after this failure.
        retry: u64,
        /// Back-off before reconnecting.
        delay: Duration,
    },

    /// The client moved between lifecycle states.
    Transition {
        /// Previous state.
        from: ClientState,
        /// New state.
        to: ClientState,
    },

    /// The client observed shutdown and released its session.
    Stopped {
        /// Final retry counter.
        retries: u64,
    },
}

impl ClientEvent {
    /// Check if this is a telemetry write that the socket only partly accepted.
    pub fn is_partial_send(&self) -> bool {
        matches!(self, ClientEvent::DataSent { written, requested } if written < requested)
    }
}

/// Receiver of a client's [`ClientEvent`]s.
///
/// Each client owns its sink; nothing is shared between clients unless the
/// implementation chooses to.
pub trait EventSink: Send {
    /// Record one event.
    fn emit(&mut self, event: ClientEvent);
}

/// Sink that writes every event as a `tracing` record.
#[derive(Debug, Clone)]
pub struct TracingSink {
    client: String,
}

impl TracingSink {
    /// Create a sink labelling every record with `client`.
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
        }
    }
}

impl EventSink for TracingSink {
    fn emit(&mut self, event: ClientEvent) {
        let client = self.client.as_str();
        match event {
            ClientEvent::ConnectAttempt { addr } => {
                info!(client, %addr, "Attempting connection");
            }
            ClientEvent::Connected { addr } => {
                info!(client, %addr, "Connected to server");
            }
            ClientEvent::ConnectFailed { reason } => {
                error!(client, %reason, "Connection failed");
            }
            ClientEvent::LoginSent { payload, written } => {
                info!(
                    client,
                    written,
                    login = %String::from_utf8_lossy(&payload),
                    "Login message sent (no response expected)"
                );
            }
            ClientEvent::LoginDeferred => {
                warn!(client, "Login write accepted no bytes, retrying");
            }
            ClientEvent::DataSent { written, requested } => {
                if written < requested {
                    warn!(client, written, requested, "Telemetry partially sent");
                } else {
                    info!(client, written, "Telemetry sent");
                }
            }
            ClientEvent::DataReceived { data } => {
                info!(
                    client,
                    bytes = data.len(),
                    data = %String::from_utf8_lossy(&data),
                    "Received data"
                );
            }
            ClientEvent::Disconnected { reason } => {
                warn!(client, %reason, "Disconnected");
            }
            ClientEvent::Reconnecting { retry, delay } => {
                info!(client, retry, delay_ms = delay.as_millis() as u64, "Reconnect attempt");
            }
            ClientEvent::Transition { from, to } => {
                debug!(client, %from, %to, "State transition");
            }
            ClientEvent::Stopped { retries } => {
                info!(client, retries, "Client stopped");
            }
        }
    }
}

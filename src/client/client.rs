//! Per-device state machine.
//!
//! One [`SmartwatchClient`] owns one credential, one connector and one event
//! sink. It loops forever over lifecycle attempts:
//!
//! ```text
//!   CONNECTING ──connect ok──▶ AUTHENTICATING ──login written──▶ STREAMING
//!       │                            │                              │
//!       └──────────── any failure ───┴──────────────────────────────┘
//!                                    ▼
//!                                  ERROR ──back-off──▶ CONNECTING
//! ```
//!
//! Each readiness pass handles at most one connect-ready, one write-ready and
//! one read-ready, in that order, then yields for the poll interval.

use std::any::Any;
use std::mem;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use thiserror::Error;
use tokio::io::Interest;
use tokio::sync::watch;

use super::config::ClientConfig;
use super::events::{ClientEvent, EventSink};
use super::shutdown::Shutdown;
use super::state::ClientState;
use crate::payload::{Credential, PayloadError, build_login_payload, build_telemetry_payload};
use crate::transport::{Connector, ReadOutcome, Session, TransportError};

/// Errors that end one lifecycle attempt.
///
/// None of these escape [`SmartwatchClient::run`]; they are turned into an
/// `Error` state and a reconnect.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, write, read, EOF).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Telemetry could not be serialized.
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    /// Handling a readiness event panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl ClientError {
    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_owned(),
                Err(_) => "unknown panic".to_owned(),
            },
        };
        ClientError::Panicked(message)
    }
}

/// What a client reports once it has stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSummary {
    /// Client name.
    pub name: String,
    /// Failed lifecycle attempts.
    pub retries: u64,
    /// State the client was in when shutdown arrived.
    pub final_state: ClientState,
}

/// One simulated smartwatch.
pub struct SmartwatchClient<C: Connector, K: EventSink> {
    /// Name used in every event.
    name: String,
    /// Device identity.
    credential: Credential,
    /// Timing and endpoint.
    config: ClientConfig,
    /// Opens a fresh session per attempt.
    connector: C,
    /// Where lifecycle events go.
    sink: K,
    /// Current lifecycle state.
    state: ClientState,
    /// Failed attempts so far. Never reset.
    retries: u64,
    /// Publishes `state` to observers.
    state_tx: watch::Sender<ClientState>,
}

impl<C: Connector, K: EventSink> SmartwatchClient<C, K> {
    /// Create a client in the `Connecting` state.
    pub fn new(
        name: impl Into<String>,
        credential: Credential,
        config: ClientConfig,
        connector: C,
        sink: K,
    ) -> Self {
        let (state_tx, _) = watch::channel(ClientState::Connecting);
        Self {
            name: name.into(),
            credential,
            config,
            connector,
            sink,
            state: ClientState::Connecting,
            retries: 0,
            state_tx,
        }
    }

    /// Get the client name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the credential this client logs in with.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Get the current lifecycle state.
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Get the retry counter.
    pub fn retries(&self) -> u64 {
        self.retries
    }

    /// Subscribe to state changes.
    pub fn watch_state(&self) -> watch::Receiver<ClientState> {
        self.state_tx.subscribe()
    }

    /// Run lifecycle attempts until `shutdown` fires.
    ///
    /// Never returns an error: failures are retried after the back-off.
    /// The session of the current attempt is closed before this returns.
    pub async fn run(mut self, mut shutdown: Shutdown) -> ClientSummary {
        while !shutdown.is_triggered() {
            let error = match self.attempt(&mut shutdown).await {
                Ok(()) => break,
                Err(error) => error,
            };
            self.fail(error);

            let delay = self.config.backoff.delay(self.retries);
            self.sink.emit(ClientEvent::Reconnecting {
                retry: self.retries,
                delay,
            });
            if shutdown.sleep(delay).await.is_break() {
                break;
            }
            self.transition(ClientState::Connecting);
        }

        self.sink.emit(ClientEvent::Stopped {
            retries: self.retries,
        });
        ClientSummary {
            name: self.name,
            retries: self.retries,
            final_state: self.state,
        }
    }

    /// One lifecycle attempt on a brand-new session.
    ///
    /// `Ok` means shutdown was observed; every failure is an `Err`.
    async fn attempt(&mut self, shutdown: &mut Shutdown) -> Result<(), ClientError> {
        let addr = self.config.server_addr;
        self.sink.emit(ClientEvent::ConnectAttempt { addr });

        let mut session = self.connector.open(addr)?;
        // A panic ends this attempt like any other failure.
        let outcome = AssertUnwindSafe(self.drive(&mut session, shutdown))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(ClientError::from_panic(payload)));
        session.close();
        outcome
    }

    async fn drive(
        &mut self,
        session: &mut C::Session,
        shutdown: &mut Shutdown,
    ) -> Result<(), ClientError> {
        loop {
            if shutdown.is_triggered() {
                return Ok(());
            }

            let ready = session.poll_readiness(self.config.poll_timeout).await?;

            if ready.connectable && self.state == ClientState::Connecting {
                session.complete_connect()?;
                self.sink.emit(ClientEvent::Connected {
                    addr: self.config.server_addr,
                });
                self.transition(ClientState::Authenticating);
            }

            match self.state {
                ClientState::Authenticating if ready.writable => self.send_login(session)?,
                ClientState::Streaming => {
                    if ready.writable {
                        self.send_telemetry(session)?;
                        if shutdown.sleep(self.config.send_interval).await.is_break() {
                            return Ok(());
                        }
                    }
                    if ready.readable {
                        self.drain(session)?;
                    }
                }
                _ => {}
            }

            if shutdown.sleep(self.config.poll_interval).await.is_break() {
                return Ok(());
            }
        }
    }

    fn send_login(&mut self, session: &mut C::Session) -> Result<(), ClientError> {
        let payload = build_login_payload(&self.credential);
        let written = session.write_bytes(&payload)?;
        if written == 0 {
            self.sink.emit(ClientEvent::LoginDeferred);
            return Ok(());
        }

        // Login is fire-and-forget: accepted bytes count as authenticated.
        session.set_interest(Interest::WRITABLE | Interest::READABLE);
        self.sink.emit(ClientEvent::LoginSent { payload, written });
        self.transition(ClientState::Streaming);
        Ok(())
    }

    fn send_telemetry(&mut self, session: &mut C::Session) -> Result<(), ClientError> {
        let payload = build_telemetry_payload(self.credential.device_id())?;
        // A short write is not resubmitted.
        let written = session.write_bytes(&payload)?;
        self.sink.emit(ClientEvent::DataSent {
            written,
            requested: payload.len(),
        });
        Ok(())
    }

    fn drain(&mut self, session: &mut C::Session) -> Result<(), ClientError> {
        match session.read_bytes()? {
            ReadOutcome::Data(data) => self.sink.emit(ClientEvent::DataReceived { data }),
            ReadOutcome::NoData => {}
            ReadOutcome::Eof => return Err(TransportError::PeerClosed.into()),
        }
        Ok(())
    }

    fn fail(&mut self, error: ClientError) {
        let reason = error.to_string();
        let event = if self.state == ClientState::Connecting {
            ClientEvent::ConnectFailed { reason }
        } else {
            ClientEvent::Disconnected { reason }
        };
        self.sink.emit(event);
        self.transition(ClientState::Error);
        self.retries += 1;
    }

    fn transition(&mut self, next: ClientState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        let from = mem::replace(&mut self.state, next);
        self.state_tx.send_replace(next);
        self.sink.emit(ClientEvent::Transition { from, to: next });
    }
}

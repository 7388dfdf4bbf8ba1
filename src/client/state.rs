//! Client lifecycle state.

use std::fmt;

/// Lifecycle state of one client.
///
/// Transitions are strictly sequential (`Connecting → Authenticating →
/// Streaming`); `Error` is reachable from anywhere and only leads back to
/// `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientState {
    /// Socket opened, handshake pending.
    Connecting,
    /// Connected, login not yet accepted by the socket.
    Authenticating,
    /// Logged in, sending telemetry.
    Streaming,
    /// Lifecycle attempt failed, backing off.
    Error,
}

impl ClientState {
    /// Check if moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: ClientState) -> bool {
        use ClientState::*;
        matches!(
            (self, next),
            (Connecting, Authenticating)
                | (Authenticating, Streaming)
                | (Connecting | Authenticating | Streaming, Error)
                | (Error, Connecting)
        )
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "CONNECTING"),
            Self::Authenticating => write!(f, "AUTHENTICATING"),
            Self::Streaming => write!(f, "STREAMING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

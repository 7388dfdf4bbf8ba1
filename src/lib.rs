//! # watchsim
//!
//! A fleet of simulated smartwatches streaming telemetry to a TCP server.
//!
//! Each simulated device runs an independent client that:
//!
//! - **Connects**: opens a non-blocking TCP session and waits for connect-readiness
//! - **Authenticates**: writes a login blob derived from its credential
//! - **Streams**: writes one randomized telemetry record every send interval,
//!   draining anything the server sends back
//! - **Recovers**: on any failure closes the session, waits out a back-off and
//!   starts over on a fresh one
//!
//! ## Modules
//!
//! - [`core`]: Error taxonomy and default constants
//! - [`payload`]: Login and telemetry payload generation
//! - [`transport`]: Readiness-driven TCP sessions
//! - [`client`]: The per-device state machine
//! - [`supervisor`]: Starting and stopping a fleet of clients
//! - [`config`]: TOML configuration for the simulator binary
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use watchsim::prelude::*;
//!
//! # async fn run() {
//! let config = ClientConfigBuilder::new()
//!     .server_addr("127.0.0.1:5000".parse().unwrap())
//!     .build();
//!
//! let mut supervisor = Supervisor::new(config);
//! for credential in Credential::roster().into_iter().take(3) {
//!     supervisor.spawn(credential);
//! }
//!
//! tokio::signal::ctrl_c().await.unwrap();
//! supervisor.shutdown_all().await;
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod core;

pub mod payload;

pub mod transport;

pub mod client;

pub mod supervisor;

pub mod config;

#[cfg(test)]
pub(crate) mod testing;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;

    pub use crate::payload::{
        Credential, PayloadError, PayloadResult, TelemetryRecord, build_login_payload,
        build_telemetry_payload,
    };

    pub use crate::transport::{
        Connector, ReadOutcome, Readiness, Session, TcpConnector, TcpSession, TransportError,
        TransportResult,
    };

    pub use crate::client::{
        BackoffPolicy, ClientConfig, ClientConfigBuilder, ClientEvent, ClientState, EventSink,
        Shutdown, ShutdownTrigger, SmartwatchClient, TracingSink, shutdown_channel,
    };

    pub use crate::supervisor::{ClientHandle, Supervisor};

    pub use crate::config::{ConfigError, SimulatorConfig};
}

// Re-export commonly used items at crate root
pub use client::{ClientConfig, ClientState, SmartwatchClient};
pub use core::{SimError, SimResult};
pub use payload::Credential;
pub use supervisor::Supervisor;

//! Simulator configuration.
//!
//! Read from a TOML file by the `watchsim` binary. Every field is optional;
//! a missing file or an empty one gives the built-in fleet:
//!
//! ```toml
//! server = "0.0.0.0:5000"
//! clients = 3
//!
//! [timing]
//! send_interval_ms = 2000
//! reconnect_delay_ms = 3000
//! poll_interval_ms = 10
//!
//! [[credentials]]
//! user = "SmartWatch1"
//! password = "SmartWatch348091"
//! device_id = "Watch11"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{BackoffPolicy, ClientConfig, ClientConfigBuilder};
use crate::core::{
    DEFAULT_CLIENT_COUNT, DEFAULT_SERVER_ADDR, INBOUND_BUFFER_SIZE, POLL_INTERVAL,
    RECONNECT_DELAY, SEND_INTERVAL,
};
use crate::payload::Credential;

/// Errors while loading the simulator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but cannot be used together.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Telemetry server address.
    #[serde(default = "default_server")]
    pub server: SocketAddr,

    /// Number of clients to start, taken from the front of `credentials`.
    #[serde(default = "default_clients")]
    pub clients: usize,

    /// Timing overrides.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Device credentials, in start order.
    #[serde(default = "Credential::roster")]
    pub credentials: Vec<Credential>,
}

/// Timing and buffer settings shared by every client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Delay after each telemetry record, in milliseconds.
    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,

    /// Back-off before reconnecting, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Ceiling for an exponential back-off, in milliseconds.
    ///
    /// When set, the back-off doubles from `reconnect_delay_ms` up to this
    /// value; otherwise it stays fixed.
    #[serde(default)]
    pub reconnect_max_ms: Option<u64>,

    /// Pause between readiness passes, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Inbound buffer capacity in bytes.
    #[serde(default = "default_inbound_buffer_size")]
    pub inbound_buffer_size: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            clients: default_clients(),
            timing: TimingConfig::default(),
            credentials: Credential::roster(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            send_interval_ms: default_send_interval_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            reconnect_max_ms: None,
            poll_interval_ms: default_poll_interval_ms(),
            inbound_buffer_size: default_inbound_buffer_size(),
        }
    }
}

fn default_server() -> SocketAddr {
    DEFAULT_SERVER_ADDR
}

fn default_clients() -> usize {
    DEFAULT_CLIENT_COUNT
}

fn default_send_interval_ms() -> u64 {
    SEND_INTERVAL.as_millis() as u64
}

fn default_reconnect_delay_ms() -> u64 {
    RECONNECT_DELAY.as_millis() as u64
}

fn default_poll_interval_ms() -> u64 {
    POLL_INTERVAL.as_millis() as u64
}

fn default_inbound_buffer_size() -> usize {
    INBOUND_BUFFER_SIZE
}

impl SimulatorConfig {
    /// Load and validate a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values can be used together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clients == 0 {
            return Err(ConfigError::Invalid("clients must be at least 1".into()));
        }
        if self.clients > self.credentials.len() {
            return Err(ConfigError::Invalid(format!(
                "clients ({}) exceeds the {} credentials available",
                self.clients,
                self.credentials.len()
            )));
        }
        if self.timing.send_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "send_interval_ms must be greater than zero".into(),
            ));
        }
        if self.timing.inbound_buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "inbound_buffer_size must be greater than zero".into(),
            ));
        }
        if let Some(max) = self.timing.reconnect_max_ms {
            if max < self.timing.reconnect_delay_ms {
                return Err(ConfigError::Invalid(format!(
                    "reconnect_max_ms ({max}) is below reconnect_delay_ms ({})",
                    self.timing.reconnect_delay_ms
                )));
            }
        }
        Ok(())
    }

    /// Back-off policy described by the timing section.
    pub fn backoff(&self) -> BackoffPolicy {
        let base = Duration::from_millis(self.timing.reconnect_delay_ms);
        match self.timing.reconnect_max_ms {
            Some(max) => BackoffPolicy::Exponential {
                base,
                max: Duration::from_millis(max),
            },
            None => BackoffPolicy::Fixed(base),
        }
    }

    /// Client configuration shared by every simulated device.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfigBuilder::new()
            .server_addr(self.server)
            .send_interval(Duration::from_millis(self.timing.send_interval_ms))
            .poll_interval(Duration::from_millis(self.timing.poll_interval_ms))
            .backoff(self.backoff())
            .inbound_buffer_size(self.timing.inbound_buffer_size)
            .build()
    }

    /// Credentials of the clients to start.
    pub fn active_credentials(&self) -> &[Credential] {
        let count = self.clients.min(self.credentials.len());
        &self.credentials[..count]
    }
}

//! Client configuration.

use std::net::SocketAddr;
use std::time::Duration;

use super::backoff::BackoffPolicy;
use crate::core::{
    DEFAULT_SERVER_ADDR, INBOUND_BUFFER_SIZE, POLL_INTERVAL, POLL_TIMEOUT, SEND_INTERVAL,
};

/// Client configuration.
///
/// Fixed at construction; a running client never re-reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Server address to connect to.
    pub server_addr: SocketAddr,

    /// Pause between readiness passes.
    pub poll_interval: Duration,

    /// Longest a single readiness pass may wait.
    pub poll_timeout: Duration,

    /// Delay after each telemetry record.
    pub send_interval: Duration,

    /// Delay before reconnecting.
    pub backoff: BackoffPolicy,

    /// Inbound buffer capacity in bytes.
    pub inbound_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDR,
            poll_interval: POLL_INTERVAL,
            poll_timeout: POLL_TIMEOUT,
            send_interval: SEND_INTERVAL,
            backoff: BackoffPolicy::default(),
            inbound_buffer_size: INBOUND_BUFFER_SIZE,
        }
    }
}

/// Builder for creating a [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the server address.
    pub fn server_addr(mut self, addr: SocketAddr) -> Self {
        self.config.server_addr = addr;
        self
    }

    /// Set the pause between readiness passes.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the longest wait of a single readiness pass.
    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.config.poll_timeout = timeout;
        self
    }

    /// Set the delay after each telemetry record.
    pub fn send_interval(mut self, interval: Duration) -> Self {
        self.config.send_interval = interval;
        self
    }

    /// Use a fixed reconnect delay.
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffPolicy::Fixed(delay);
        self
    }

    /// Set the reconnect back-off policy.
    pub fn backoff(mut self, policy: BackoffPolicy) -> Self {
        self.config.backoff = policy;
        self
    }

    /// Set the inbound buffer capacity.
    pub fn inbound_buffer_size(mut self, size: usize) -> Self {
        self.config.inbound_buffer_size = size.max(1);
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RECONNECT_DELAY;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.server_addr.port(), 5000);
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.send_interval, Duration::from_millis(2000));
        assert_eq!(config.backoff, BackoffPolicy::Fixed(RECONNECT_DELAY));
        assert_eq!(config.inbound_buffer_size, 1000);
    }

    #[test]
    fn test_builder() {
        let addr: SocketAddr = "127.0.0.1:7000".parse().unwrap();
        let config = ClientConfigBuilder::new()
            .server_addr(addr)
            .send_interval(Duration::from_millis(50))
            .reconnect_delay(Duration::from_millis(75))
            .inbound_buffer_size(64)
            .build();

        assert_eq!(config.server_addr, addr);
        assert_eq!(config.send_interval, Duration::from_millis(50));
        assert_eq!(config.backoff, BackoffPolicy::Fixed(Duration::from_millis(75)));
        assert_eq!(config.inbound_buffer_size, 64);
        assert_eq!(config.poll_interval, POLL_INTERVAL);
    }

    #[test]
    fn test_zero_buffer_size_clamped() {
        let config = ClientConfigBuilder::new().inbound_buffer_size(0).build();
        assert_eq!(config.inbound_buffer_size, 1);
    }
}

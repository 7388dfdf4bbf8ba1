//! Default values for the simulated devices.
//!
//! These are the timings and sizes the device firmware uses. All of them can
//! be overridden through [`ClientConfig`](crate::client::ClientConfig); none
//! of them are read as process-wide state.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

// =============================================================================
// ENDPOINT
// =============================================================================

/// Default telemetry server endpoint.
pub const DEFAULT_SERVER_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5000);

/// Default number of simulated devices started by the binary.
pub const DEFAULT_CLIENT_COUNT: usize = 3;

// =============================================================================
// TIMING
// =============================================================================

/// Pause between two readiness passes of one client.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Upper bound on how long a single readiness pass may wait.
///
/// Zero makes the pass a pure non-blocking check.
pub const POLL_TIMEOUT: Duration = Duration::ZERO;

/// Delay imposed after each telemetry record before the next write.
pub const SEND_INTERVAL: Duration = Duration::from_millis(2000);

/// Back-off before reconnecting after a failed lifecycle attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Ceiling for the opt-in exponential back-off policy.
pub const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

// =============================================================================
// BUFFERS
// =============================================================================

/// Capacity of the reusable inbound buffer (one read's worth of data).
pub const INBOUND_BUFFER_SIZE: usize = 1000;

// =============================================================================
// TELEMETRY
// =============================================================================

/// Latitude the simulated positions are scattered around.
pub const BASE_LATITUDE: f64 = 25.750635;

/// Longitude the simulated positions are scattered around.
pub const BASE_LONGITUDE: f64 = 81.169144;

/// Activity mode reported by every device.
pub const ACTIVITY_MODE: &str = "walk";

//! Simulated telemetry records.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Serialize, Serializer};

use super::PayloadResult;
use crate::core::{ACTIVITY_MODE, BASE_LATITUDE, BASE_LONGITUDE};

/// One telemetry sample as sent by a device.
///
/// Field names on the wire follow the device firmware, not Rust naming.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    /// Device identifier.
    #[serde(rename = "vEh")]
    pub device_id: String,
    /// Latitude in degrees.
    #[serde(rename = "lT")]
    pub latitude: f64,
    /// Longitude in degrees.
    #[serde(rename = "lOn")]
    pub longitude: f64,
    /// Sample time, seconds since the Unix epoch.
    #[serde(rename = "tIme")]
    pub timestamp: u64,
    /// Speed, 0-9.
    #[serde(rename = "sPeed")]
    pub speed: u8,
    /// Heart rate in bpm, 60-99. Sent as a JSON string.
    #[serde(rename = "heartBeat", serialize_with = "as_string")]
    pub heart_rate: u8,
    /// Step count, 0-9999.
    pub steps: u16,
    /// Battery percentage, 70-99.
    pub battery: u8,
    /// Signal strength in dBm, -70 to -61.
    #[serde(rename = "signalStrength")]
    pub signal_strength: i8,
    /// Activity mode.
    pub mode: &'static str,
}

impl TelemetryRecord {
    /// Sample a record for `device_id` from the given random source.
    pub fn sample<R: Rng>(device_id: &str, rng: &mut R, timestamp: u64) -> Self {
        Self {
            device_id: device_id.to_owned(),
            latitude: BASE_LATITUDE + rng.gen_range(0.0..1.0),
            longitude: BASE_LONGITUDE + rng.gen_range(0.0..1.0),
            timestamp,
            speed: rng.gen_range(0..10),
            heart_rate: rng.gen_range(60..100),
            steps: rng.gen_range(0..10_000),
            battery: rng.gen_range(70..100),
            signal_strength: rng.gen_range(-70..-60),
            mode: ACTIVITY_MODE,
        }
    }

    /// Serialize the record to its wire bytes.
    pub fn to_bytes(&self) -> PayloadResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

fn as_string<S: Serializer>(value: &u8, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Build one freshly sampled telemetry message for `device_id`.
///
/// Every call draws new values from the thread-local random source and
/// stamps the current wall-clock time.
pub fn build_telemetry_payload(device_id: &str) -> PayloadResult<Vec<u8>> {
    TelemetryRecord::sample(device_id, &mut rand::thread_rng(), epoch_seconds()).to_bytes()
}

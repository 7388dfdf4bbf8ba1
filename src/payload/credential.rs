//! Device credentials and the login blob built from them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of one simulated device.
///
/// A credential is immutable once built. The `device_id` doubles as the
/// vehicle/device identifier in every telemetry record the device sends.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Account name the device logs in with.
    user: String,
    /// Account password.
    password: String,
    /// Device identifier (`secret1` on the wire).
    device_id: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            device_id: device_id.into(),
        }
    }

    /// Get the user name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Get the device identifier.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// The built-in device roster.
    ///
    /// Seven watches, `SmartWatch1` through `SmartWatch7`.
    pub fn roster() -> Vec<Credential> {
        const ROSTER: [(&str, &str, &str); 7] = [
            ("SmartWatch1", "SmartWatch348091", "Watch11"),
            ("SmartWatch2", "SmartWatch876746", "Watch12"),
            ("SmartWatch3", "SmartWatch165965", "Watch13"),
            ("SmartWatch4", "SmartWatch345279", "Watch14"),
            ("SmartWatch5", "SmartWatch976455", "Watch15"),
            ("SmartWatch6", "SmartWatch938966", "Watch16"),
            ("SmartWatch7", "SmartWatch312767", "Watch17"),
        ];

        ROSTER
            .iter()
            .map(|(user, password, device)| Credential::new(*user, *password, *device))
            .collect()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("device_id", &self.device_id)
            .finish()
    }
}

/// Build the login message for a credential.
///
/// Deterministic: the same credential always yields the same bytes.
///
/// Wire format: `{"uSer": <user>, "pWd":<password>, "secret1":<device_id>}`,
/// with each value JSON-escaped.
pub fn build_login_payload(credential: &Credential) -> Vec<u8> {
    format!(
        "{{\"uSer\": {}, \"pWd\":{}, \"secret1\":{}}}",
        Value::from(credential.user.as_str()),
        Value::from(credential.password.as_str()),
        Value::from(credential.device_id.as_str()),
    )
    .into_bytes()
}

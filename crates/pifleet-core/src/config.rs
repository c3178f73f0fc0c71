// ── Runtime fleet configuration ──
//
// How the core talks to appliances and what the background refresh does.
// Never touches disk: the CLI builds a `FleetConfig` from settings and
// hands it in.

use std::path::PathBuf;
use std::time::Duration;

use pifleet_api::{SESSION_CHECK_TIMEOUT, TlsMode, TransportConfig};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (appliances with self-signed certs).
    DangerAcceptInvalid,
}

/// What the periodic refresh propagates from the reference.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SyncMode {
    /// Status refresh only; propagation is operator-triggered.
    #[default]
    Partial,
    /// Status refresh followed by a sync of every entity kind.
    Full,
}

/// Configuration for a fleet handle.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    pub tls: TlsVerification,
    /// Uniform request timeout. `None` leaves requests bounded only by the
    /// transport defaults.
    pub timeout: Option<Duration>,
    /// Bound on the session liveness check.
    pub session_check_timeout: Duration,
    pub sync_mode: SyncMode,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            tls: TlsVerification::default(),
            timeout: None,
            session_check_timeout: SESSION_CHECK_TIMEOUT,
            sync_mode: SyncMode::default(),
        }
    }
}

impl FleetConfig {
    /// Transport settings for the shared HTTP client.
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            session_check_timeout: self.session_check_timeout,
        }
    }
}

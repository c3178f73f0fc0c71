// ── Core error types ──
//
// Errors for the non-action surface of the core (lookups, instance
// management, stats, persistence). Action and sync operations never
// return these: they fold every failure into an `ActionStatus`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Instance not found: {id}")]
    InstanceNotFound { id: u32 },

    #[error("Reference instance not found")]
    ReferenceNotFound,

    // ── Persistence ──────────────────────────────────────────────────
    #[error("Instance store error: {message}")]
    Store { message: String },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Appliance errors (wrapped) ───────────────────────────────────
    #[error("Cannot reach appliance: {message}")]
    ConnectionFailed { message: String },

    #[error("Appliance API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::Store {
            message: err.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<pifleet_api::Error> for CoreError {
    fn from(err: pifleet_api::Error) -> Self {
        if err.is_connectivity() {
            return CoreError::ConnectionFailed {
                message: err.to_string(),
            };
        }
        match err {
            pifleet_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            pifleet_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            other => CoreError::Api {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

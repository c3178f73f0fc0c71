use thiserror::Error;

/// Top-level error type for the `pifleet-api` crate.
///
/// Covers every failure mode of a single request/response cycle against
/// one appliance. `pifleet-core` folds these into instance statuses and
/// action results; nothing here ever reaches an operator unattributed.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The appliance rejected the credential or session (HTTP 401/403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing or construction error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// Non-2xx response that is not an authentication rejection.
    #[error("Appliance API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A well-formed response lacked a field the protocol requires.
    #[error("Response is missing the `{field}` field")]
    MissingField { field: &'static str },
}

impl Error {
    /// Returns `true` if the appliance itself rejected the credential.
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` for refused connections, unreachable hosts and
    /// timeouts: the "appliance is probably down" family.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn auth_rejection_is_not_connectivity() {
        let err = Error::Authentication {
            message: "HTTP 401".into(),
        };
        assert!(err.is_auth_rejected());
        assert!(!err.is_connectivity());
    }

    #[test]
    fn timeout_counts_as_connectivity() {
        assert!(Error::Timeout { timeout_secs: 3 }.is_connectivity());
    }

    #[test]
    fn api_error_exposes_status() {
        let err = Error::Api {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(err.status(), Some(502));
        assert!(!err.is_connectivity());
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The pair granted by an appliance after a successful login.
///
/// Both values are opaque. `sid` is sent as a header on reads; `csrf`
/// accompanies every mutating request.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub sid: String,
    pub csrf: String,
}

impl Session {
    pub fn new(sid: impl Into<String>, csrf: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            csrf: csrf.into(),
        }
    }

    /// `true` when no session has been granted yet (or it was cleared).
    pub fn is_empty(&self) -> bool {
        self.sid.is_empty()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("sid", &redact(&self.sid))
            .field("csrf", &redact(&self.csrf))
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "<empty>" } else { "<redacted>" }
}

/// Outcome of one login attempt, folded into the three settled statuses.
///
/// Login never fails past this boundary: every error path lands in
/// [`Unauthorized`](Self::Unauthorized) or [`Unreachable`](Self::Unreachable).
#[derive(Debug)]
pub enum SessionResult {
    /// Login accepted; the session is ready for authenticated calls.
    Active(Session),
    /// The appliance answered 401/403 to the API key.
    Unauthorized { message: String },
    /// Network failure, timeout, malformed body, or any other non-2xx.
    /// The error is kept for logging only.
    Unreachable(Error),
}

impl From<Result<Session, Error>> for SessionResult {
    fn from(result: Result<Session, Error>) -> Self {
        match result {
            Ok(session) => Self::Active(session),
            Err(Error::Authentication { message }) => Self::Unauthorized { message },
            Err(other) => Self::Unreachable(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_tokens() {
        let session = Session::new("abc", "");
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("abc"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("<empty>"));
    }

    #[test]
    fn auth_error_maps_to_unauthorized() {
        let result: Result<Session, Error> = Err(Error::Authentication {
            message: "HTTP 401".into(),
        });
        assert!(matches!(
            SessionResult::from(result),
            SessionResult::Unauthorized { .. }
        ));
    }

    #[test]
    fn protocol_error_maps_to_unreachable() {
        let result: Result<Session, Error> = Err(Error::MissingField { field: "session" });
        assert!(matches!(
            SessionResult::from(result),
            SessionResult::Unreachable(Error::MissingField { .. })
        ));
    }
}

// Pi-hole API HTTP client
//
// Wraps `reqwest::Client` with appliance URL construction, session header
// injection, and body decoding. Endpoint groups (auth, actions, entities,
// stats) are implemented as inherent methods in sibling files to keep this
// module focused on transport mechanics.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::trace;
use url::Url;

use crate::auth::Session;
use crate::error::Error;
use crate::transport::{SESSION_CHECK_TIMEOUT, TransportConfig};

/// Raw HTTP client for one appliance.
///
/// Holds no session state: every authenticated call takes the [`Session`]
/// explicitly, so a single pooled `reqwest::Client` can serve a whole fleet
/// and concurrent callers never share mutable credentials.
#[derive(Debug, Clone)]
pub struct PiholeClient {
    http: reqwest::Client,
    base_url: Url,
    session_check_timeout: Duration,
}

impl PiholeClient {
    /// Create a client with its own connection pool from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            session_check_timeout: transport.session_check_timeout,
        })
    }

    /// Create a client on top of an existing (shared) `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            session_check_timeout: SESSION_CHECK_TIMEOUT,
        }
    }

    /// Override the bound on [`check_session`](Self::check_session).
    pub fn with_session_check_timeout(mut self, timeout: Duration) -> Self {
        self.session_check_timeout = timeout;
        self
    }

    /// The appliance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn session_check_timeout(&self) -> Duration {
        self.session_check_timeout
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{segments...}`, percent-encoding each segment.
    ///
    /// Natural keys such as list addresses contain `/` and `:`; pushing
    /// them as single segments keeps them addressable.
    pub(crate) fn api_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Attach the session headers the appliance expects on authenticated
    /// calls. Empty values are sent as-is; the appliance's 401 is the
    /// signal, not a client-side check.
    pub(crate) fn authed(
        &self,
        builder: reqwest::RequestBuilder,
        session: &Session,
    ) -> reqwest::RequestBuilder {
        builder
            .header("sid", session.sid.as_str())
            .header("X-FTL-CSRF", session.csrf.as_str())
    }

    /// JSON body shared by the `POST` control endpoints.
    pub(crate) fn session_body(session: &Session) -> serde_json::Map<String, serde_json::Value> {
        let mut body = serde_json::Map::new();
        body.insert("csrf".into(), session.csrf.clone().into());
        body.insert("sid".into(), session.sid.clone().into());
        body
    }

    pub(crate) fn password_body(password: &SecretString) -> serde_json::Value {
        serde_json::json!({ "password": password.expose_secret() })
    }

    /// Send a request, mapping only transport failures.
    pub(crate) async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, Error> {
        let resp = builder.send().await.map_err(Error::Transport)?;
        trace!(status = %resp.status(), url = %resp.url(), "response received");
        Ok(resp)
    }

    /// Reject non-2xx responses: 401/403 as [`Error::Authentication`],
    /// everything else as [`Error::Api`] with a body preview.
    pub(crate) async fn require_success(
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("appliance rejected the request (HTTP {status})"),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }
        Ok(resp)
    }

    /// Decode a JSON body, keeping the raw text on failure.
    pub(crate) async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

fn preview(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}

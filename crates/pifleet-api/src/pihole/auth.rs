// Pi-hole API authentication
//
// The appliance grants a (sid, csrf) pair in exchange for the API key
// (sent as the password). Sessions expire server-side; the liveness check
// lets callers detect that before issuing real work.

use secrecy::SecretString;
use tracing::debug;

use crate::auth::{Session, SessionResult};
use crate::error::Error;
use crate::pihole::client::PiholeClient;
use crate::pihole::models::AuthResponse;

impl PiholeClient {
    /// Exchange the API key for a session.
    ///
    /// `POST /api/auth` with `{"password": ...}`
    ///
    /// - HTTP 401/403 → [`Error::Authentication`]
    /// - 2xx carrying a valid `session` object → the captured [`Session`]
    /// - anything else (non-2xx, malformed body, `valid: false`, empty sid or csrf)
    ///   → a transport / API / protocol error
    pub async fn authenticate(&self, password: &SecretString) -> Result<Session, Error> {
        let url = self.api_url(&["auth"])?;
        debug!("authenticating at {}", url);

        let resp = self
            .send(self.http().post(url).json(&Self::password_body(password)))
            .await?;
        let resp = Self::require_success(resp).await?;
        let body: AuthResponse = Self::decode(resp).await?;

        let payload = body.session.ok_or(Error::MissingField { field: "session" })?;
        if !payload.valid {
            return Err(Error::Api {
                status: 200,
                message: payload
                    .message
                    .unwrap_or_else(|| "session marked invalid".into()),
            });
        }

        let sid = payload
            .sid
            .filter(|s| !s.is_empty())
            .ok_or(Error::MissingField { field: "session.sid" })?;
        let csrf = payload
            .csrf
            .filter(|s| !s.is_empty())
            .ok_or(Error::MissingField {
                field: "session.csrf",
            })?;

        debug!("authentication successful");
        Ok(Session { sid, csrf })
    }

    /// [`authenticate`](Self::authenticate), folded into a [`SessionResult`].
    pub async fn login(&self, password: &SecretString) -> SessionResult {
        SessionResult::from(self.authenticate(password).await)
    }

    /// Ask whether the appliance still accepts `session`.
    ///
    /// `GET /api/auth` with the `sid` header, bounded by the session-check
    /// timeout. Returns `Ok(true)` only on HTTP 200. Never mutates anything.
    pub async fn check_session(&self, session: &Session) -> Result<bool, Error> {
        let url = self.api_url(&["auth"])?;
        debug!("checking session at {}", url);

        let builder = self
            .http()
            .get(url)
            .header("sid", session.sid.as_str())
            .timeout(self.session_check_timeout());
        let resp = self.send(builder).await?;

        Ok(resp.status() == reqwest::StatusCode::OK)
    }
}

// Pi-hole API control endpoints
//
// Blocking toggle, resolver restart, gravity rebuild. Each returns a plain
// success flag; only transport failures surface as errors.

use serde_json::Value;
use tracing::debug;

use crate::auth::Session;
use crate::error::Error;
use crate::pihole::client::PiholeClient;
use crate::pihole::models::ActionResponse;

impl PiholeClient {
    /// Disable blocking for `seconds`.
    ///
    /// `POST /api/dns/blocking` with `{"blocking": false, "timer": seconds}`
    pub async fn pause_blocking(&self, session: &Session, seconds: u64) -> Result<bool, Error> {
        debug!(seconds, "pausing blocking");
        self.set_blocking(session, false, Some(seconds)).await
    }

    /// Re-enable blocking.
    ///
    /// `POST /api/dns/blocking` with `{"blocking": true}`
    pub async fn resume_blocking(&self, session: &Session) -> Result<bool, Error> {
        debug!("resuming blocking");
        self.set_blocking(session, true, None).await
    }

    async fn set_blocking(
        &self,
        session: &Session,
        blocking: bool,
        timer: Option<u64>,
    ) -> Result<bool, Error> {
        let url = self.api_url(&["dns", "blocking"])?;
        let mut body = Self::session_body(session);
        body.insert("blocking".into(), Value::Bool(blocking));
        if let Some(timer) = timer {
            body.insert("timer".into(), Value::from(timer));
        }

        let resp = self
            .send(self.authed(self.http().post(url), session).json(&body))
            .await?;
        Ok(resp.status() == reqwest::StatusCode::OK)
    }

    /// Restart the resolver.
    ///
    /// `POST /api/action/restartdns`. Stricter than the other actions: an
    /// HTTP 200 only counts when the body also reports `"status": "ok"`.
    pub async fn restart_dns(&self, session: &Session) -> Result<bool, Error> {
        let url = self.api_url(&["action", "restartdns"])?;
        debug!("restarting resolver at {}", url);

        let resp = self
            .send(
                self.authed(self.http().post(url), session)
                    .json(&Self::session_body(session)),
            )
            .await?;
        if resp.status() != reqwest::StatusCode::OK {
            return Ok(false);
        }

        // A body that does not decode is treated the same as a missing status.
        let body: ActionResponse = Self::decode(resp).await.unwrap_or_default();
        Ok(body.status.as_deref() == Some("ok"))
    }

    /// Rebuild the block database.
    ///
    /// `POST /api/action/gravity`
    pub async fn update_gravity(&self, session: &Session) -> Result<bool, Error> {
        let url = self.api_url(&["action", "gravity"])?;
        debug!("rebuilding gravity at {}", url);

        let resp = self
            .send(
                self.authed(self.http().post(url), session)
                    .json(&Self::session_body(session)),
            )
            .await?;
        Ok(resp.status() == reqwest::StatusCode::OK)
    }
}

// ── Session manager ──
//
// Authentication state machine for one instance at a time:
//
//   unauthenticated ──login ok──▶ active
//   unauthenticated ──401/403──▶ unauthorized
//   any ──network/protocol failure──▶ unreachable
//   active ──check rejected──▶ (re-login before returning)
//
// Works on values: callers hand in an instance and get the resolved one
// back. Persistence belongs to the fleet.

use std::time::Duration;

use pifleet_api::{PiholeClient, SessionResult};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::model::{Instance, InstanceStatus};

/// Resolves instance sessions over a shared HTTP connection pool.
#[derive(Debug, Clone)]
pub struct SessionManager {
    http: reqwest::Client,
    session_check_timeout: Duration,
}

impl SessionManager {
    pub fn new(http: reqwest::Client, session_check_timeout: Duration) -> Self {
        Self {
            http,
            session_check_timeout,
        }
    }

    /// Protocol client addressing `instance`.
    pub fn client_for(&self, instance: &Instance) -> Result<PiholeClient, pifleet_api::Error> {
        let base_url = Url::parse(&instance.url)?;
        Ok(PiholeClient::with_client(self.http.clone(), base_url)
            .with_session_check_timeout(self.session_check_timeout))
    }

    /// Check the current session and log in again if it was rejected.
    ///
    /// The check is always sent, also for an instance that holds no
    /// session yet. A check accepted without a stored `sid` still leads
    /// to a login.
    ///
    /// Returns the resolved instance. An `active` result always carries a
    /// non-empty session; any other result carries none.
    pub async fn revalidate(&self, instance: &Instance) -> Instance {
        let client = match self.client_for(instance) {
            Ok(client) => client,
            Err(e) => {
                let mut resolved = instance.clone();
                check_error(&resolved, &e);
                resolved.deactivate(InstanceStatus::Unreachable);
                return resolved;
            }
        };

        match client.check_session(&instance.session()).await {
            Ok(true) if instance.has_session() => {
                debug!(instance = %instance.name, "session still valid");
                let mut resolved = instance.clone();
                resolved.status = InstanceStatus::Active;
                return resolved;
            }
            Ok(_) => {
                debug!(instance = %instance.name, "session rejected, logging in again");
            }
            Err(e) => {
                debug!(instance = %instance.name, error = %e, "session check failed, logging in again");
            }
        }

        Self::login_with(&client, instance).await
    }

    /// Authenticate from scratch, ignoring any current session.
    pub async fn login(&self, instance: &Instance) -> Instance {
        match self.client_for(instance) {
            Ok(client) => Self::login_with(&client, instance).await,
            Err(e) => {
                let mut resolved = instance.clone();
                check_error(&resolved, &e);
                resolved.deactivate(InstanceStatus::Unreachable);
                resolved
            }
        }
    }

    async fn login_with(client: &PiholeClient, instance: &Instance) -> Instance {
        let mut resolved = instance.clone();
        match client.login(&instance.api_key_secret()).await {
            SessionResult::Active(session) => resolved.activate(session),
            SessionResult::Unauthorized { message } => {
                warn!(instance = %instance.name, %message, "API key rejected");
                resolved.deactivate(InstanceStatus::Unauthorized);
            }
            SessionResult::Unreachable(e) => {
                check_error(instance, &e);
                resolved.deactivate(InstanceStatus::Unreachable);
            }
        }

        if resolved.status != instance.status {
            info!(
                instance = %instance.name,
                from = %instance.status,
                to = %resolved.status,
                "instance status changed"
            );
        }
        resolved
    }
}

/// Log a failure that resolves an instance to `unreachable`.
///
/// Refused connections, unreachable hosts and timeouts are routine for a
/// fleet with appliances that come and go; everything else is logged with
/// full context. The resulting status is the same either way.
pub fn check_error(instance: &Instance, err: &pifleet_api::Error) {
    if err.is_connectivity() {
        warn!(
            instance = %instance.name,
            url = %instance.url,
            "appliance unreachable: {err}"
        );
    } else {
        error!(
            instance = %instance.name,
            url = %instance.url,
            error = ?err,
            "appliance request failed: {err}"
        );
    }
}

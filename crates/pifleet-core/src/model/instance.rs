// ── Instance domain type ──

use std::fmt;

use pifleet_api::Session;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Liveness of one appliance as last resolved by the session manager.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InstanceStatus {
    Active,
    Unauthorized,
    #[default]
    Unreachable,
    /// Placeholder shown while a check is in flight. Display-only: status
    /// resolution never settles here.
    Refreshing,
}

impl InstanceStatus {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

/// One managed appliance.
///
/// The persisted field names (`apiKey`, `isReference`) are part of the
/// on-disk instance collection and must stay stable.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: u32,
    pub name: String,
    pub url: String,
    pub api_key: String,
    #[serde(default)]
    pub is_reference: bool,
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub csrf: String,
    #[serde(default)]
    pub status: InstanceStatus,
}

impl Instance {
    /// A fresh, never-authenticated instance.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            url: url.into(),
            api_key: api_key.into(),
            is_reference: false,
            sid: String::new(),
            csrf: String::new(),
            status: InstanceStatus::Unreachable,
        }
    }

    pub fn session(&self) -> Session {
        Session::new(self.sid.clone(), self.csrf.clone())
    }

    pub fn has_session(&self) -> bool {
        !self.sid.is_empty()
    }

    /// The API key wrapped for transmission.
    pub fn api_key_secret(&self) -> SecretString {
        SecretString::from(self.api_key.clone())
    }

    /// Record a successful login.
    pub fn activate(&mut self, session: Session) {
        self.sid = session.sid;
        self.csrf = session.csrf;
        self.status = InstanceStatus::Active;
    }

    /// Drop any session and settle on a non-active status.
    pub fn deactivate(&mut self, status: InstanceStatus) {
        self.sid.clear();
        self.csrf.clear();
        self.status = status;
    }

    /// Copy the fields owned by the session manager from `other`.
    pub fn adopt_session_state(&mut self, other: &Instance) {
        self.sid.clone_from(&other.sid);
        self.csrf.clone_from(&other.csrf);
        self.status = other.status;
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("url", &self.url)
            .field("is_reference", &self.is_reference)
            .field("session", &self.session())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Fields for a new instance. The id is assigned by the fleet.
#[derive(Clone)]
pub struct NewInstance {
    pub name: String,
    pub url: String,
    pub api_key: String,
    pub is_reference: bool,
}

impl fmt::Debug for NewInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewInstance")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("is_reference", &self.is_reference)
            .finish_non_exhaustive()
    }
}

/// Partial update for an existing instance. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct InstanceEdit {
    pub name: Option<String>,
    pub url: Option<String>,
    pub api_key: Option<SecretString>,
    pub is_reference: Option<bool>,
}

impl InstanceEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.url.is_none()
            && self.api_key.is_none()
            && self.is_reference.is_none()
    }
}

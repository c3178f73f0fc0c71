// Pi-hole API request/response types
//
// Models for the appliance's v6 JSON API. Fields use `#[serde(default)]`
// liberally: the configuration collections carry bookkeeping fields
// (ids, timestamps) that differ per appliance and are never replayed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

// ── Auth ─────────────────────────────────────────────────────────────

/// `POST /api/auth` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(default)]
    pub session: Option<SessionPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionPayload {
    #[serde(default = "default_true")]
    pub valid: bool,
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub csrf: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_true() -> bool {
    true
}

// ── Actions ──────────────────────────────────────────────────────────

/// Body of `POST /api/action/*` responses. Only `restartdns` is judged by it.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ActionResponse {
    #[serde(default)]
    pub status: Option<String>,
}

/// Outcome block of every configuration write.
///
/// ```json
/// { "processed": { "success": [...], "errors": [...] } }
/// ```
#[derive(Debug, Deserialize)]
pub(crate) struct ProcessedResponse {
    #[serde(default)]
    pub processed: Option<Processed>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Processed {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

// ── Configuration entities ───────────────────────────────────────────

/// A configuration record that can be read from one appliance and written,
/// keyed by its natural key, to another.
pub trait ConfigEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name: both the URL segment (`/api/{COLLECTION}`) and the
    /// field holding the array in the list response.
    const COLLECTION: &'static str;

    /// Path segments after `/api/{COLLECTION}/` that address this record.
    fn key_segments(&self) -> Vec<&str>;

    /// Query parameters that complete the address.
    fn key_query(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }

    /// Mutable fields sent as the PUT body.
    fn upsert_body(&self) -> serde_json::Value;

    /// Short human-readable form of the natural key, for logs.
    fn display_key(&self) -> String {
        self.key_segments().join("/")
    }
}

/// A client group. Keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Appliance-local id. Informational; ids are not remapped across
    /// instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

impl ConfigEntity for Group {
    const COLLECTION: &'static str = "groups";

    fn key_segments(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn upsert_body(&self) -> serde_json::Value {
        json!({
            "name": self.name,
            "comment": self.comment,
            "enabled": self.enabled,
        })
    }
}

/// Whether a subscribed list allows or blocks its domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Allow,
    Block,
}

impl ListType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Block => "block",
        }
    }
}

/// A subscribed adlist. Keyed by address plus type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adlist {
    pub address: String,
    #[serde(rename = "type")]
    pub list_type: ListType,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub groups: Vec<u32>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ConfigEntity for Adlist {
    const COLLECTION: &'static str = "lists";

    fn key_segments(&self) -> Vec<&str> {
        vec![self.address.as_str()]
    }

    fn key_query(&self) -> Vec<(&'static str, &str)> {
        vec![("type", self.list_type.as_str())]
    }

    fn upsert_body(&self) -> serde_json::Value {
        json!({
            "comment": self.comment,
            "type": self.list_type,
            "groups": self.groups,
            "enabled": self.enabled,
        })
    }

    fn display_key(&self) -> String {
        format!("{} ({})", self.address, self.list_type.as_str())
    }
}

/// Allow or deny semantics of a domain rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
    Allow,
    Deny,
}

impl DomainType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

/// Matching mode of a domain rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainKind {
    Exact,
    Regex,
}

impl DomainKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Regex => "regex",
        }
    }
}

/// An exact or regex domain rule. Keyed by (domain, type, kind).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub domain: String,
    #[serde(rename = "type")]
    pub domain_type: DomainType,
    pub kind: DomainKind,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub groups: Vec<u32>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ConfigEntity for Domain {
    const COLLECTION: &'static str = "domains";

    fn key_segments(&self) -> Vec<&str> {
        vec![
            self.domain_type.as_str(),
            self.kind.as_str(),
            self.domain.as_str(),
        ]
    }

    fn upsert_body(&self) -> serde_json::Value {
        json!({
            "type": self.domain_type,
            "kind": self.kind,
            "comment": self.comment,
            "groups": self.groups,
            "enabled": self.enabled,
        })
    }
}

/// A client definition (IP, MAC, hostname, subnet or interface).
/// Keyed by the client identifier. The appliance has no enable toggle
/// for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub client: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub groups: Vec<u32>,
}

impl ConfigEntity for Client {
    const COLLECTION: &'static str = "clients";

    fn key_segments(&self) -> Vec<&str> {
        vec![self.client.as_str()]
    }

    fn upsert_body(&self) -> serde_json::Value {
        json!({
            "comment": self.comment,
            "groups": self.groups,
        })
    }
}

// ── Stats ────────────────────────────────────────────────────────────

/// `GET /api/stats/summary`.
///
/// The summary carries dozens of counters that vary by FTL version. The
/// commonly displayed ones are typed; everything lands in `extra` too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsSummary {
    #[serde(default)]
    pub queries: QueryStats,
    #[serde(default)]
    pub clients: ClientStats,
    #[serde(default)]
    pub gravity: GravityStats,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub blocked: u64,
    #[serde(default)]
    pub percent_blocked: f64,
    #[serde(default)]
    pub unique_domains: u64,
    #[serde(default)]
    pub forwarded: u64,
    #[serde(default)]
    pub cached: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientStats {
    #[serde(default)]
    pub active: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GravityStats {
    #[serde(default)]
    pub domains_being_blocked: i64,
    /// Unix timestamp of the last gravity rebuild.
    #[serde(default)]
    pub last_update: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn domain_key_is_type_kind_domain() {
        let domain = Domain {
            domain: "ads.example.com".into(),
            domain_type: DomainType::Deny,
            kind: DomainKind::Exact,
            comment: None,
            groups: vec![0],
            enabled: true,
        };
        assert_eq!(
            domain.key_segments(),
            vec!["deny", "exact", "ads.example.com"]
        );
    }

    #[test]
    fn adlist_deserializes_and_ignores_bookkeeping() {
        let list: Adlist = serde_json::from_value(json!({
            "address": "https://example.com/hosts.txt",
            "type": "block",
            "comment": null,
            "groups": [0, 2],
            "enabled": false,
            "id": 7,
            "date_added": 1_700_000_000,
            "number": 1234
        }))
        .unwrap();
        assert_eq!(list.list_type, ListType::Block);
        assert_eq!(list.groups, vec![0, 2]);
        assert!(!list.enabled);
        assert_eq!(list.key_query(), vec![("type", "block")]);
    }

    #[test]
    fn client_body_has_no_enabled_flag() {
        let client = Client {
            client: "192.168.1.20".into(),
            comment: Some("laptop".into()),
            groups: vec![1],
        };
        let body = client.upsert_body();
        assert!(body.get("enabled").is_none());
        assert_eq!(body["groups"], json!([1]));
    }

    #[test]
    fn stats_keep_unknown_fields() {
        let stats: StatsSummary = serde_json::from_value(json!({
            "queries": { "total": 10, "blocked": 2, "percent_blocked": 20.0 },
            "clients": { "active": 3, "total": 5 },
            "gravity": { "domains_being_blocked": 100_000, "last_update": 1_700_000_000 },
            "took": 0.003
        }))
        .unwrap();
        assert_eq!(stats.queries.blocked, 2);
        assert_eq!(stats.clients.total, 5);
        assert!(stats.extra.contains_key("took"));
    }
}

// pifleet-api: Async Rust client for the Pi-hole v6 session-based HTTP API

pub mod auth;
pub mod error;
pub mod pihole;
pub mod transport;

pub use auth::{Session, SessionResult};
pub use error::Error;
pub use pihole::PiholeClient;
pub use pihole::models::{
    Adlist, Client, ClientStats, ConfigEntity, Domain, DomainKind, DomainType, GravityStats,
    Group, ListType, QueryStats, StatsSummary,
};
pub use transport::{SESSION_CHECK_TIMEOUT, TlsMode, TransportConfig};

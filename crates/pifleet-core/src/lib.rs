//! Session lifecycle and fleet coordination for Pi-hole appliances.
//!
//! This crate sits between `pifleet-api` (one HTTP call against one
//! appliance) and the CLI:
//!
//! - **[`SessionManager`]**: resolves one instance's session: checks the
//!   current `sid`, logs in again when it was rejected, and settles on
//!   `active`, `unauthorized` or `unreachable`. Works on values and never
//!   returns errors; failures are logged per the connectivity policy in
//!   [`session::check_error`].
//!
//! - **[`Fleet`]**: explicitly constructed, cheaply cloneable handle over
//!   an [`InstanceStore`]. Runs liveness checks and control actions
//!   (pause, resume, restart, gravity) concurrently across instances and
//!   reports one [`ActionStatus`] per instance. Also owns instance
//!   management and the single-reference invariant.
//!
//! - **Reference sync** ([`Fleet::sync_from_reference`]): replays groups,
//!   lists, domains or clients from the reference instance onto every
//!   other instance.
//!
//! - **[`InstanceStore`]**: persistence seam for the instance collection.
//!   [`MemoryStore`] is the in-process implementation; the JSON file store
//!   lives in `pifleet-config`.

pub mod config;
pub mod error;
pub mod fleet;
pub mod model;
pub mod session;
pub mod store;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{FleetConfig, SyncMode, TlsVerification};
pub use error::CoreError;
pub use fleet::{Fleet, UNREACHABLE_MESSAGE};
pub use session::SessionManager;
pub use store::{InstanceStore, MemoryStore};

pub use model::{
    ActionStatus, EntityKind, Instance, InstanceEdit, InstanceStatus, NewInstance, TimeScale,
    UNKNOWN_INSTANCE,
};

// Appliance types that appear in this crate's public API.
pub use pifleet_api::{Session, StatsSummary};

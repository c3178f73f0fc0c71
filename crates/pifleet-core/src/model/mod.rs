// ── Domain model ──

pub mod action;
pub mod instance;

pub use action::{ActionStatus, EntityKind, TimeScale, UNKNOWN_INSTANCE, describe_seconds};
pub use instance::{Instance, InstanceEdit, InstanceStatus, NewInstance};

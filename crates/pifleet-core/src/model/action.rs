// ── Action results ──

use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use super::instance::InstanceStatus;

/// Attribution used when a failure cannot be tied to a stored instance.
pub const UNKNOWN_INSTANCE: &str = "Unknown instance";

/// Uniform per-instance outcome of a control or sync operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionStatus {
    pub success: bool,
    /// Instance name the outcome is attributed to.
    pub instance: String,
    pub message: String,
    pub instance_status: Option<InstanceStatus>,
}

impl ActionStatus {
    pub fn success(
        instance: impl Into<String>,
        message: impl Into<String>,
        status: InstanceStatus,
    ) -> Self {
        Self {
            success: true,
            instance: instance.into(),
            message: message.into(),
            instance_status: Some(status),
        }
    }

    pub fn failure(
        instance: impl Into<String>,
        message: impl Into<String>,
        status: Option<InstanceStatus>,
    ) -> Self {
        Self {
            success: false,
            instance: instance.into(),
            message: message.into(),
            instance_status: status,
        }
    }
}

/// A configuration collection propagated from the reference.
///
/// Declaration order is the propagation order: lists, domains and clients
/// reference group ids, so groups go first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Groups,
    Lists,
    Domains,
    Clients,
}

impl EntityKind {
    /// Capitalized form for messages ("Groups updated successfully").
    pub fn title(self) -> &'static str {
        match self {
            Self::Groups => "Groups",
            Self::Lists => "Lists",
            Self::Domains => "Domains",
            Self::Clients => "Clients",
        }
    }
}

/// Unit for pause durations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum TimeScale {
    #[default]
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeScale {
    pub fn seconds_per_unit(self) -> u64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 60 * 60,
            Self::Days => 60 * 60 * 24,
        }
    }

    /// `amount` of this unit in seconds, saturating on overflow.
    pub fn to_seconds(self, amount: u64) -> u64 {
        amount.saturating_mul(self.seconds_per_unit())
    }
}

/// Render a second count in the largest unit that divides it evenly.
pub fn describe_seconds(seconds: u64) -> String {
    let scale = [TimeScale::Days, TimeScale::Hours, TimeScale::Minutes]
        .into_iter()
        .find(|scale| seconds > 0 && seconds % scale.seconds_per_unit() == 0)
        .unwrap_or(TimeScale::Seconds);
    let amount = seconds / scale.seconds_per_unit();
    let unit = scale.to_string();
    if amount == 1 {
        format!("1 {}", unit.trim_end_matches('s'))
    } else {
        format!("{amount} {unit}")
    }
}

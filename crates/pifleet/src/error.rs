//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help
//! text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use pifleet_config::ConfigError;
use pifleet_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the appliance: {message}")]
    #[diagnostic(
        code(pifleet::connection_failed),
        help(
            "Check that the appliance is running and its URL is correct.\n\
             Self-signed certificates need --insecure (-k)."
        )
    )]
    ConnectionFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(pifleet::not_found),
        help("Run: pifleet {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No reference instance is configured")]
    #[diagnostic(
        code(pifleet::no_reference),
        help("Pick one with: pifleet instances set-reference <ID>")
    )]
    NoReference,

    // ── Appliance / store ────────────────────────────────────────────
    #[error("Appliance error: {message}")]
    #[diagnostic(code(pifleet::api_error))]
    Api { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(pifleet::store),
        help("Check the instance file given by --instances or [store] in the settings.")
    )]
    Store { message: String },

    /// Outcomes were printed; some of them were failures.
    #[error("{failed} of {total} operations failed")]
    #[diagnostic(code(pifleet::action_failed))]
    ActionsFailed { failed: usize, total: usize },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(pifleet::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(pifleet::config),
        help("Inspect the resolved settings with: pifleet config show")
    )]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(pifleet::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {message}")]
    #[diagnostic(code(pifleet::render))]
    Render { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } | Self::NoReference => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Error for a missing instance id.
    pub fn instance_not_found(id: u32) -> Self {
        Self::NotFound {
            resource_type: "instance".into(),
            identifier: id.to_string(),
            list_command: "instances list".into(),
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InstanceNotFound { id } => Self::instance_not_found(id),
            CoreError::ReferenceNotFound => Self::NoReference,
            CoreError::Store { message } => Self::Store { message },
            CoreError::Validation { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::ConnectionFailed { message } => Self::ConnectionFailed { message },
            CoreError::Api { message, status } => Self::Api {
                message: match status {
                    Some(code) => format!("{message} (HTTP {code})"),
                    None => message,
                },
            },
            CoreError::Config { message } => Self::Validation {
                field: "settings".into(),
                reason: message,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(
            CliError::from(CoreError::InstanceNotFound { id: 3 }).exit_code(),
            exit_code::NOT_FOUND
        );
        assert_eq!(
            CliError::from(CoreError::ConnectionFailed {
                message: "refused".into()
            })
            .exit_code(),
            exit_code::CONNECTION
        );
        assert_eq!(
            CliError::from(CoreError::validation("bad url")).exit_code(),
            exit_code::USAGE
        );
        assert_eq!(
            CliError::ActionsFailed { failed: 1, total: 2 }.exit_code(),
            exit_code::GENERAL
        );
    }

    #[test]
    fn api_status_is_kept_in_the_message() {
        let err = CliError::from(CoreError::Api {
            message: "rejected".into(),
            status: Some(400),
        });
        assert_eq!(err.to_string(), "Appliance error: rejected (HTTP 400)");
    }
}

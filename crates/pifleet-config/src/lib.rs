//! Settings and instance persistence for pifleet.
//!
//! TOML settings layered with `PIFLEET_*` environment variables, the
//! translation to `pifleet_core::FleetConfig`, and [`JsonFileStore`], the
//! on-disk implementation of `pifleet_core::InstanceStore`.

mod store;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pifleet_core::{FleetConfig, SyncMode, TlsVerification};

pub use store::JsonFileStore;

/// Prefix for environment overrides. Nested keys are separated by `__`,
/// e.g. `PIFLEET_REFRESH__INTERVAL=10`.
pub const ENV_PREFIX: &str = "PIFLEET_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("instance file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Output and transport defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Background refresh behaviour (`pifleet watch`).
    #[serde(default)]
    pub refresh: Refresh,

    /// Where the instance collection lives.
    #[serde(default)]
    pub store: Store,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Accept self-signed appliance certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Uniform request timeout in seconds. Unset: only the session check
    /// is bounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Path to a custom CA certificate (PEM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: None,
            ca_cert: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Refresh {
    /// Periodically refresh instance statuses.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between refreshes.
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// `partial`: statuses only. `full`: statuses, then a sync of every
    /// entity kind from the reference.
    #[serde(default)]
    pub sync: SyncMode,
}

impl Default for Refresh {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: default_interval(),
            sync: SyncMode::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Store {
    /// Instance collection file. Defaults to `instances.json` in the
    /// platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<PathBuf>,
}

fn default_output() -> String {
    "table".into()
}
fn default_true() -> bool {
    true
}
fn default_interval() -> u64 {
    30
}

impl Config {
    /// Resolved path of the instance collection file.
    pub fn instances_path(&self) -> PathBuf {
        self.store
            .instances
            .clone()
            .unwrap_or_else(default_instances_path)
    }

    /// Period for the background refresh, `None` when disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh.enabled && self.refresh.interval > 0)
            .then_some(Duration::from_secs(self.refresh.interval))
    }

    /// Translate to the runtime configuration consumed by the core.
    pub fn fleet_config(&self) -> Result<FleetConfig, ConfigError> {
        if self.defaults.timeout == Some(0) {
            return Err(ConfigError::Validation {
                field: "defaults.timeout".into(),
                reason: "must be greater than zero".into(),
            });
        }

        let tls = if self.defaults.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.defaults.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        Ok(FleetConfig {
            tls,
            timeout: self.defaults.timeout.map(Duration::from_secs),
            sync_mode: self.refresh.sync,
            ..FleetConfig::default()
        })
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "pifleet", "pifleet")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("pifleet");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the instance collection.
pub fn default_instances_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("instances.json"),
        |dirs| dirs.data_dir().join("instances.json"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults ← TOML file at `path` (if present) ← `PIFLEET_*` env.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

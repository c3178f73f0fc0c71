//! Settings resolution for the CLI.
//!
//! Loads the layered settings from `pifleet-config`, then applies the
//! global flags on top.

use std::path::PathBuf;

use clap::ValueEnum;
use tracing::{debug, warn};

use pifleet_config::{Config, JsonFileStore};
use pifleet_core::Fleet;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Settings file in effect: `--config`, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(pifleet_config::config_path)
}

/// Load settings and fold the global flag overrides into them.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = config_path(global);
    let mut cfg = pifleet_config::load_config_from(&path)?;
    debug!(path = %path.display(), "settings loaded");

    if global.insecure {
        cfg.defaults.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        cfg.defaults.timeout = Some(timeout);
    }
    if let Some(ref instances) = global.instances {
        cfg.store.instances = Some(instances.clone());
    }
    Ok(cfg)
}

/// `--output` wins; otherwise the settings' `defaults.output`.
pub fn resolve_output(global: &mut GlobalOpts, cfg: &Config) {
    if global.output.is_some() {
        return;
    }
    match OutputFormat::from_str(&cfg.defaults.output, true) {
        Ok(format) => global.output = Some(format),
        Err(_) => warn!(
            output = %cfg.defaults.output,
            "unknown output format in settings, using table"
        ),
    }
}

/// Build the fleet handle over the JSON instance file.
pub fn build_fleet(cfg: &Config) -> Result<Fleet<JsonFileStore>, CliError> {
    let store = JsonFileStore::new(cfg.instances_path());
    let fleet_config = cfg.fleet_config()?;
    debug!(instances = %store.path().display(), "opening fleet");
    Ok(Fleet::new(store, fleet_config)?)
}

//! Settings subcommand handlers.

use std::io::{self, IsTerminal};

use dialoguer::{Confirm, Input, Select};

use pifleet_config::Config;
use pifleet_core::SyncMode;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn render_toml(cfg: &Config) -> Result<String, CliError> {
    toml::to_string_pretty(cfg).map_err(|e| CliError::Render {
        message: e.to_string(),
    })
}

/// Ask for each setting, starting from `base`.
fn prompt_settings(base: Config) -> Result<Config, CliError> {
    let mut cfg = base;

    let formats = ["table", "json", "json-compact", "yaml", "plain"];
    let current = formats
        .iter()
        .position(|f| *f == cfg.defaults.output)
        .unwrap_or(0);
    let selection = Select::new()
        .with_prompt("Default output format")
        .items(&formats)
        .default(current)
        .interact()
        .map_err(prompt_err)?;
    cfg.defaults.output = formats.get(selection).copied().unwrap_or("table").into();

    cfg.defaults.insecure = Confirm::new()
        .with_prompt("Accept self-signed appliance certificates?")
        .default(cfg.defaults.insecure)
        .interact()
        .map_err(prompt_err)?;

    cfg.refresh.interval = Input::new()
        .with_prompt("Seconds between background refreshes")
        .default(cfg.refresh.interval)
        .validate_with(|v: &u64| if *v > 0 { Ok(()) } else { Err("must be > 0") })
        .interact_text()
        .map_err(prompt_err)?;

    let modes = [
        "partial (refresh statuses only)",
        "full (refresh, then sync from the reference)",
    ];
    let mode = Select::new()
        .with_prompt("Background refresh mode")
        .items(&modes)
        .default(usize::from(cfg.refresh.sync == SyncMode::Full))
        .interact()
        .map_err(prompt_err)?;
    cfg.refresh.sync = if mode == 1 {
        SyncMode::Full
    } else {
        SyncMode::Partial
    };

    let instances: String = Input::new()
        .with_prompt("Instance file")
        .default(cfg.instances_path().display().to_string())
        .interact_text()
        .map_err(prompt_err)?;
    cfg.store.instances = Some(instances.into());

    Ok(cfg)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let out = match global.output {
                None | Some(OutputFormat::Table | OutputFormat::Plain) => render_toml(&cfg)?,
                Some(format) => output::render_single(format, &cfg, |_| String::new(), |_| {
                    String::new()
                })?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init => {
            let path = config::config_path(global);
            let interactive = io::stdin().is_terminal();

            if path.exists()
                && !global.yes
                && (!interactive
                    || !Confirm::new()
                        .with_prompt(format!("{} exists. Overwrite?", path.display()))
                        .default(false)
                        .interact()
                        .map_err(prompt_err)?)
            {
                if interactive {
                    return Ok(());
                }
                return Err(CliError::NonInteractiveRequiresYes {
                    action: "config init".into(),
                });
            }

            let base = pifleet_config::load_config_from(&path)?;
            let cfg = if interactive && !global.yes {
                prompt_settings(base)?
            } else {
                base
            };

            pifleet_config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("Settings written to {}", path.display());
            }
            Ok(())
        }
    }
}

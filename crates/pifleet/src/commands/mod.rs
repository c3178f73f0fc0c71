//! Command dispatch: bridges CLI args -> fleet operations -> output formatting.

pub mod actions;
pub mod config_cmd;
pub mod instances;
pub mod stats;
pub mod status;
pub mod sync;
pub mod util;
pub mod watch;

use pifleet_config::{Config, JsonFileStore};
use pifleet_core::Fleet;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a fleet-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    fleet: &Fleet<JsonFileStore>,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Instances(args) => instances::handle(fleet, args, global).await,
        Command::Status(args) => status::handle(fleet, args, global).await,
        Command::Pause(args) => actions::pause(fleet, args, global).await,
        Command::Resume(args) => actions::resume(fleet, args, global).await,
        Command::Restart(args) => actions::restart(fleet, args, global).await,
        Command::Gravity(args) => actions::gravity(fleet, args, global).await,
        Command::Sync(args) => sync::handle(fleet, args, global).await,
        Command::Stats(args) => stats::handle(fleet, args, global).await,
        Command::Watch(args) => watch::handle(fleet, cfg, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

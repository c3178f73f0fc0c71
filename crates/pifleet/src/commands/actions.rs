//! Blocking control handlers: pause, resume, restart, gravity.
//!
//! Each runs against one instance or, with `--all`, the whole fleet, and
//! reports one outcome per instance.

use pifleet_config::JsonFileStore;
use pifleet_core::{Fleet, TimeScale};

use crate::cli::{GlobalOpts, PauseArgs, TargetArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn pause(
    fleet: &Fleet<JsonFileStore>,
    args: PauseArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.duration == 0 {
        return Err(CliError::Validation {
            field: "duration".into(),
            reason: "must be greater than zero".into(),
        });
    }
    let seconds = TimeScale::from(args.unit).to_seconds(args.duration);

    let outcomes = match args.target.id {
        Some(id) => vec![fleet.pause(id, seconds).await],
        None => {
            let pb = util::spinner("Pausing blocking...", global.quiet);
            let all = fleet.pause_all(seconds).await;
            pb.finish_and_clear();
            all
        }
    };
    output::report_outcomes(global.format(), &outcomes, global.quiet)
}

pub async fn resume(
    fleet: &Fleet<JsonFileStore>,
    target: TargetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcomes = match target.id {
        Some(id) => vec![fleet.resume(id).await],
        None => {
            let pb = util::spinner("Resuming blocking...", global.quiet);
            let all = fleet.resume_all().await;
            pb.finish_and_clear();
            all
        }
    };
    output::report_outcomes(global.format(), &outcomes, global.quiet)
}

pub async fn restart(
    fleet: &Fleet<JsonFileStore>,
    target: TargetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcomes = match target.id {
        Some(id) => vec![fleet.restart(id).await],
        None => {
            if !util::confirm(
                "Restart DNS on every instance?",
                "restart --all",
                global.yes,
            )? {
                return Ok(());
            }
            let pb = util::spinner("Restarting DNS...", global.quiet);
            let all = fleet.restart_all().await;
            pb.finish_and_clear();
            all
        }
    };
    output::report_outcomes(global.format(), &outcomes, global.quiet)
}

pub async fn gravity(
    fleet: &Fleet<JsonFileStore>,
    target: TargetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let pb = util::spinner("Updating gravity...", global.quiet);
    let outcomes = match target.id {
        Some(id) => vec![fleet.rebuild_gravity(id).await],
        None => fleet.rebuild_gravity_all().await,
    };
    pb.finish_and_clear();
    output::report_outcomes(global.format(), &outcomes, global.quiet)
}

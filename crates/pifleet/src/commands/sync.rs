//! Reference sync handler.

use pifleet_config::JsonFileStore;
use pifleet_core::{EntityKind, Fleet};

use crate::cli::{GlobalOpts, SyncArgs, SyncTarget};
use crate::error::CliError;
use crate::output;

use super::util;

fn entity_kind(target: SyncTarget) -> Option<EntityKind> {
    match target {
        SyncTarget::Groups => Some(EntityKind::Groups),
        SyncTarget::Lists => Some(EntityKind::Lists),
        SyncTarget::Domains => Some(EntityKind::Domains),
        SyncTarget::Clients => Some(EntityKind::Clients),
        SyncTarget::All => None,
    }
}

pub async fn handle(
    fleet: &Fleet<JsonFileStore>,
    args: SyncArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcomes = match entity_kind(args.target) {
        Some(kind) => {
            let pb = util::spinner(format!("Syncing {kind} from the reference..."), global.quiet);
            let outcomes = fleet.sync_from_reference(kind).await;
            pb.finish_and_clear();
            outcomes
        }
        None => {
            let pb = util::spinner("Syncing everything from the reference...", global.quiet);
            let outcomes = fleet.sync_all().await;
            pb.finish_and_clear();
            outcomes
        }
    };
    output::report_outcomes(global.format(), &outcomes, global.quiet)
}

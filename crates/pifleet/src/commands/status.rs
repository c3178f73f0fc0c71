//! Status refresh handler.

use pifleet_config::JsonFileStore;
use pifleet_core::Fleet;

use crate::cli::{GlobalOpts, StatusArgs};
use crate::error::CliError;

use super::{instances, util};

pub async fn handle(
    fleet: &Fleet<JsonFileStore>,
    args: StatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let refreshed = match args.id {
        Some(id) => vec![fleet.refresh_status(id).await?],
        None => {
            let pb = util::spinner("Checking sessions...", global.quiet);
            let all = fleet.refresh_all().await;
            pb.finish_and_clear();
            all?
        }
    };
    instances::render_instances(&refreshed, global)
}

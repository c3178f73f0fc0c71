//! Periodic refresh until Ctrl-C.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pifleet_config::{Config, JsonFileStore};
use pifleet_core::{Fleet, SyncMode};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;

use super::instances;

fn watch_period(cfg: &Config, args: &WatchArgs) -> Result<Duration, CliError> {
    if let Some(secs) = args.interval {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be greater than zero".into(),
            });
        }
        return Ok(Duration::from_secs(secs));
    }
    cfg.refresh_interval().ok_or_else(|| CliError::Validation {
        field: "refresh".into(),
        reason: "periodic refresh is disabled in the settings; pass --interval".into(),
    })
}

pub async fn handle(
    fleet: &Fleet<JsonFileStore>,
    cfg: &Config,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let period = watch_period(cfg, &args)?;

    if !global.quiet {
        let sync = match fleet.config().sync_mode {
            SyncMode::Full => ", syncing from the reference",
            SyncMode::Partial => "",
        };
        eprintln!(
            "Refreshing every {}s{sync}. Press Ctrl-C to stop.",
            period.as_secs()
        );
    }

    let cancel = CancellationToken::new();
    let task = fleet.spawn_refresh_task(period, cancel.clone());

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
    }
    info!("stopping refresh");
    cancel.cancel();
    if let Err(e) = task.await {
        warn!(error = %e, "refresh task ended abnormally");
    }

    let latest = fleet.instances().await?;
    instances::render_instances(&latest, global)
}

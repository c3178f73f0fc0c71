//! Statistics handler.

use chrono::{DateTime, Local};
use serde::Serialize;

use pifleet_config::JsonFileStore;
use pifleet_core::{Fleet, InstanceStatus, StatsSummary};

use crate::cli::{GlobalOpts, StatsArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StatsView {
    instance: String,
    status: InstanceStatus,
    #[serde(flatten)]
    summary: StatsSummary,
}

/// Render a unix timestamp in local time, `never` for zero.
fn format_timestamp(ts: i64) -> String {
    if ts <= 0 {
        return "never".into();
    }
    DateTime::from_timestamp(ts, 0).map_or_else(
        || ts.to_string(),
        |dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    )
}

fn detail(view: &StatsView) -> String {
    let q = &view.summary.queries;
    let c = &view.summary.clients;
    let g = &view.summary.gravity;
    format!(
        "{} ({})\n\
         \n  Queries:          {}\
         \n  Blocked:          {} ({:.1}%)\
         \n  Unique domains:   {}\
         \n  Forwarded:        {}\
         \n  Cached:           {}\
         \n  Clients:          {} active / {} total\
         \n  Gravity domains:  {}\
         \n  Gravity updated:  {}",
        view.instance,
        output::status_label(view.status),
        q.total,
        q.blocked,
        q.percent_blocked,
        q.unique_domains,
        q.forwarded,
        q.cached,
        c.active,
        c.total,
        g.domains_being_blocked,
        format_timestamp(g.last_update),
    )
}

pub async fn handle(
    fleet: &Fleet<JsonFileStore>,
    args: StatsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let instance = fleet.instance(args.id).await?;
    let (summary, status) = fleet.stats(args.id).await?;
    let view = StatsView {
        instance: instance.name,
        status,
        summary,
    };
    let out = output::render_single(global.format(), &view, detail, |v| {
        v.summary.queries.blocked.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timestamp_is_never() {
        assert_eq!(format_timestamp(0), "never");
    }

    #[test]
    fn detail_lists_the_counters() {
        let mut summary = StatsSummary::default();
        summary.queries.total = 1200;
        summary.queries.blocked = 300;
        summary.queries.percent_blocked = 25.0;
        summary.clients.active = 4;
        let text = detail(&StatsView {
            instance: "den".into(),
            status: InstanceStatus::Active,
            summary,
        });
        assert!(text.contains("1200"));
        assert!(text.contains("300 (25.0%)"));
        assert!(text.contains("4 active"));
        assert!(text.contains("never"));
    }
}

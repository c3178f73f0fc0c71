//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use pifleet_core::{ActionStatus, InstanceStatus};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Color only for an interactive stdout without `NO_COLOR`.
pub fn should_color() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

pub fn status_label(status: InstanceStatus) -> String {
    let label = status.to_string();
    if !should_color() {
        return label;
    }
    match status {
        InstanceStatus::Active => label.green().to_string(),
        InstanceStatus::Unauthorized => label.yellow().to_string(),
        InstanceStatus::Unreachable => label.red().to_string(),
        InstanceStatus::Refreshing => label.cyan().to_string(),
    }
}

pub fn outcome_label(success: bool) -> String {
    match (success, should_color()) {
        (true, true) => "ok".green().to_string(),
        (false, true) => "failed".red().to_string(),
        (true, false) => "ok".into(),
        (false, false) => "failed".into(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serializable items in the chosen format.
///
/// - `table`: rows built by `to_row`
/// - `json` / `json-compact` / `yaml`: the original data via serde
/// - `plain`: one `id_fn` value per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render one item. Table output uses `detail_fn`.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

// ── Action outcomes ──────────────────────────────────────────────────

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Instance")]
    instance: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&ActionStatus> for OutcomeRow {
    fn from(s: &ActionStatus) -> Self {
        Self {
            instance: s.instance.clone(),
            result: outcome_label(s.success),
            status: s.instance_status.map(status_label).unwrap_or_default(),
            message: s.message.clone(),
        }
    }
}

/// Print per-instance outcomes, then fail if any of them failed.
pub fn report_outcomes(
    format: OutputFormat,
    outcomes: &[ActionStatus],
    quiet: bool,
) -> Result<(), CliError> {
    let out = render_list(format, outcomes, |s| OutcomeRow::from(s), |s| {
        format!("{}\t{}", s.instance, if s.success { "ok" } else { "failed" })
    })?;
    print_output(&out, quiet);

    let failed = outcomes.iter().filter(|s| !s.success).count();
    if failed > 0 {
        return Err(CliError::ActionsFailed {
            failed,
            total: outcomes.len(),
        });
    }
    Ok(())
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render {
        message: e.to_string(),
    })
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render {
        message: e.to_string(),
    })
}

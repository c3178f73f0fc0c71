//! Clap derive structures for the `pifleet` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use pifleet_core::TimeScale;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pifleet -- manage a fleet of Pi-hole v6 appliances
#[derive(Debug, Parser)]
#[command(
    name = "pifleet",
    version,
    about = "Manage a fleet of Pi-hole appliances from the command line",
    long_about = "Keeps sessions alive across several Pi-hole v6 appliances, runs \
        blocking controls on one or all of them, and replicates groups, lists, \
        domains and clients from a designated reference instance.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, env = "PIFLEET_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Instance collection file (overrides the settings)
    #[arg(long, env = "PIFLEET_INSTANCES", global = true, value_name = "PATH")]
    pub instances: Option<PathBuf>,

    /// Output format (defaults to the settings, then `table`)
    #[arg(long, short = 'o', env = "PIFLEET_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds for every appliance call
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// Output format once settings have been applied.
    pub fn format(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }
}

// ── Shared Enums ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DurationUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl From<DurationUnit> for TimeScale {
    fn from(unit: DurationUnit) -> Self {
        match unit {
            DurationUnit::Seconds => Self::Seconds,
            DurationUnit::Minutes => Self::Minutes,
            DurationUnit::Hours => Self::Hours,
            DurationUnit::Days => Self::Days,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SyncTarget {
    Groups,
    Lists,
    Domains,
    Clients,
    /// Every kind, groups first
    All,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the stored instances
    #[command(alias = "inst", alias = "i")]
    Instances(InstancesArgs),

    /// Refresh and show session status
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Pause DNS blocking
    Pause(PauseArgs),

    /// Resume DNS blocking
    Resume(TargetArgs),

    /// Restart the DNS resolver
    Restart(TargetArgs),

    /// Rebuild the gravity block database
    Gravity(TargetArgs),

    /// Replicate configuration from the reference instance
    Sync(SyncArgs),

    /// Show query statistics for one instance
    Stats(StatsArgs),

    /// Refresh statuses periodically until interrupted
    Watch(WatchArgs),

    /// Manage settings
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Instances ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InstancesArgs {
    #[command(subcommand)]
    pub command: InstancesCommand,
}

#[derive(Debug, Subcommand)]
pub enum InstancesCommand {
    /// List stored instances
    #[command(alias = "ls")]
    List,

    /// Add an instance and authenticate against it
    Add {
        /// Display name
        name: String,

        /// Base URL, e.g. http://192.168.1.2
        url: String,

        /// Application password (prompted when omitted)
        #[arg(long, env = "PIFLEET_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Make this instance the reference
        #[arg(long)]
        reference: bool,
    },

    /// Change an instance's settings
    Edit {
        id: u32,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        api_key: Option<String>,

        /// Set or clear the reference role
        #[arg(long, value_name = "BOOL")]
        reference: Option<bool>,
    },

    /// Remove an instance
    #[command(alias = "rm")]
    Remove { id: u32 },

    /// Make an instance the reference
    SetReference { id: u32 },
}

// ── Status / Controls ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Instance id (all instances when omitted)
    pub id: Option<u32>,
}

/// One instance by id, or the whole fleet.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Instance id
    pub id: Option<u32>,

    /// Apply to every instance
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct PauseArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// How long to pause for
    #[arg(long, short = 'd')]
    pub duration: u64,

    /// Unit of --duration
    #[arg(long, short = 'u', default_value = "seconds")]
    pub unit: DurationUnit,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// What to replicate
    pub target: SyncTarget,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    pub id: u32,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between refreshes (overrides the settings)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

// ── Config / Completions ─────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved settings
    Show,

    /// Write a settings file with guided setup
    Init,

    /// Print the settings file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

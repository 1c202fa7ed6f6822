//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's
//! derive macros. It is purely declarative with no side effects or I/O.
//! Defaults for `hours` and `per_page` are left as `None` here and filled
//! from the loaded configuration by the command handlers.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Vigil -- security event dashboard data layer.
///
/// Use `vigil <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about, long_about = None)]
pub struct Cli {
    /// Path to the vigil.toml configuration file.
    #[arg(short, long, default_value = "vigil.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize the local event log to the remote store.
    Sync,

    /// List events, or look one up by identifier.
    Events(EventsArgs),

    /// Dashboard aggregations.
    Dashboard(DashboardArgs),

    /// Export events as CSV or JSON.
    Export(ExportArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- events ----

/// List events with facet filters, search and pagination.
#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Look up a single event by its store identifier instead of listing.
    #[arg(long)]
    pub id: Option<String>,

    /// Page number (1-based).
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Events per page (default from configuration).
    #[arg(long)]
    pub per_page: Option<usize>,

    /// Recency window in hours, 0 for all (default from configuration).
    #[arg(long)]
    pub hours: Option<i64>,

    /// Search pattern (regex, falls back to substring on invalid syntax).
    #[arg(long, default_value = "")]
    pub search: String,

    /// Exact event type filter.
    #[arg(long, default_value = "")]
    pub event_type: String,

    /// Exact severity filter.
    #[arg(long, default_value = "")]
    pub severity: String,

    /// Exact hostname filter.
    #[arg(long, default_value = "")]
    pub hostname: String,

    /// Exact user filter.
    #[arg(long, default_value = "")]
    pub user: String,

    /// Read the local log only, never falling back to the store.
    #[arg(long)]
    pub realtime: bool,
}

// ---- dashboard ----

/// Dashboard aggregation queries.
#[derive(Args, Debug)]
pub struct DashboardArgs {
    #[command(subcommand)]
    pub action: DashboardAction,
}

/// Shared options for dashboard aggregations.
///
/// Dashboard views default to realtime (local log only); pass
/// `--realtime false` to allow the store fallback.
#[derive(Args, Debug)]
pub struct WindowArgs {
    /// Recency window in hours, 0 for all (default from configuration).
    #[arg(long)]
    pub hours: Option<i64>,

    /// Read the local log only, never falling back to the store.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub realtime: bool,
}

#[derive(Subcommand, Debug)]
pub enum DashboardAction {
    /// Per-host activity summary (event count and last activity).
    Agents(WindowArgs),

    /// Per-host event counts.
    Hosts(WindowArgs),

    /// Most recent login-related events.
    Logins {
        /// Maximum number of entries.
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Read the local log only, never falling back to the store.
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        realtime: bool,
    },

    /// Top users by event count (excludes unknown).
    TopUsers {
        #[command(flatten)]
        window: WindowArgs,

        /// Maximum number of entries.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Top processes by event count (excludes unknown).
    TopProcesses {
        #[command(flatten)]
        window: WindowArgs,

        /// Maximum number of entries.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Event counts grouped by type.
    ByType(WindowArgs),

    /// Event counts grouped by severity.
    BySeverity(WindowArgs),

    /// Hourly event timeline.
    Timeline(WindowArgs),
}

// ---- export ----

/// Export events for download.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export format (csv, json). Anything but csv means json.
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Recency window in hours, 0 for all (default from configuration).
    #[arg(long)]
    pub hours: Option<i64>,

    /// Write to this file instead of stdout.
    #[arg(short = 'o', long)]
    pub out: Option<PathBuf>,
}

// ---- config ----

/// Manage vigil configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, store, events, query).
        #[arg(long)]
        section: Option<String>,
    },
}

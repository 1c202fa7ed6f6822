//! `vigil dashboard` command handlers

use std::io::Write;

use serde::Serialize;

use vigil_core::config::VigilConfig;
use vigil_events::engine::{AgentActivity, CountEntry, LoginEntry, QueryEngine, TimelineBucket};

use crate::cli::{DashboardAction, DashboardArgs, WindowArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute a `dashboard` subcommand.
pub async fn execute(
    args: DashboardArgs,
    config: &VigilConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let engine = QueryEngine::from_config(config);
    let default_hours = config.query.default_hours;
    let hours = |window: &WindowArgs| window.hours.unwrap_or(default_hours);

    match args.action {
        DashboardAction::Agents(window) => {
            let agents = engine.active_agents(hours(&window), window.realtime).await;
            writer.render(&AgentsReport { agents })?;
        }
        DashboardAction::Hosts(window) => {
            let hosts = engine.host_counts(hours(&window), window.realtime).await;
            writer.render(&CountReport::new("Hostname", hosts))?;
        }
        DashboardAction::Logins { limit, realtime } => {
            let logins = engine.recent_logins(limit, realtime).await;
            writer.render(&LoginsReport { logins })?;
        }
        DashboardAction::TopUsers { window, limit } => {
            let users = engine
                .top_users(hours(&window), limit, window.realtime)
                .await;
            writer.render(&CountReport::new("User", users))?;
        }
        DashboardAction::TopProcesses { window, limit } => {
            let processes = engine
                .top_processes(hours(&window), limit, window.realtime)
                .await;
            writer.render(&CountReport::new("Process", processes))?;
        }
        DashboardAction::ByType(window) => {
            let types = engine.count_by_type(hours(&window), window.realtime).await;
            writer.render(&CountReport::new("Type", types))?;
        }
        DashboardAction::BySeverity(window) => {
            let severities = engine
                .count_by_severity(hours(&window), window.realtime)
                .await;
            writer.render(&CountReport::new("Severity", severities))?;
        }
        DashboardAction::Timeline(window) => {
            let buckets = engine.timeline(hours(&window), window.realtime).await;
            writer.render(&TimelineReport { buckets })?;
        }
    }
    Ok(())
}

/// Per-host activity summary.
#[derive(Serialize)]
struct AgentsReport {
    agents: Vec<AgentActivity>,
}

impl Render for AgentsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{:<20} {:<22} Events", "Hostname", "Last activity")?;
        writeln!(w, "{}", "-".repeat(52))?;
        for agent in &self.agents {
            writeln!(
                w,
                "{:<20} {:<22} {}",
                agent.hostname, agent.last_activity, agent.event_count
            )?;
        }
        Ok(())
    }
}

/// Generic key/count table with a caller-supplied key label.
#[derive(Serialize)]
struct CountReport {
    #[serde(skip)]
    label: &'static str,
    entries: Vec<CountEntry>,
}

impl CountReport {
    fn new(label: &'static str, entries: Vec<CountEntry>) -> Self {
        Self { label, entries }
    }
}

impl Render for CountReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{:<30} Count", self.label)?;
        writeln!(w, "{}", "-".repeat(38))?;
        for entry in &self.entries {
            writeln!(w, "{:<30} {}", entry.key, entry.count)?;
        }
        Ok(())
    }
}

/// Most recent login-related events.
#[derive(Serialize)]
struct LoginsReport {
    logins: Vec<LoginEntry>,
}

impl Render for LoginsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "{:<20} {:<14} {:<16} {:<8} Type",
            "Timestamp", "User", "Hostname", "Status"
        )?;
        writeln!(w, "{}", "-".repeat(76))?;
        for login in &self.logins {
            writeln!(
                w,
                "{:<20} {:<14} {:<16} {:<8} {}",
                login.timestamp, login.user, login.hostname, login.status, login.event_type
            )?;
        }
        Ok(())
    }
}

/// Hourly event counts in chronological order.
#[derive(Serialize)]
struct TimelineReport {
    buckets: Vec<TimelineBucket>,
}

impl Render for TimelineReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{:<18} Count", "Hour")?;
        writeln!(w, "{}", "-".repeat(26))?;
        for bucket in &self.buckets {
            writeln!(w, "{:<18} {}", bucket.hour, bucket.count)?;
        }
        Ok(())
    }
}

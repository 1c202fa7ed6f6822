//! `vigil events` command handler

use std::io::Write;

use serde::Serialize;

use vigil_core::config::VigilConfig;
use vigil_core::record::EventRecord;
use vigil_events::engine::{EventFilter, EventPage, QueryEngine};

use crate::cli::EventsArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `events` command.
///
/// With `--id`, performs a single lookup; otherwise lists events with
/// facet filters, search and pagination. Defaults for the recency
/// window and page size come from the configuration.
pub async fn execute(
    args: EventsArgs,
    config: &VigilConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let engine = QueryEngine::from_config(config);

    if let Some(id) = args.id {
        let report = EventLookupReport {
            found: engine.find_by_id(&id).await,
            id,
        };
        writer.render(&report)?;
        return Ok(());
    }

    let filter = EventFilter {
        event_type: args.event_type,
        severity: args.severity,
        hostname: args.hostname,
        user: args.user,
        hours: args.hours.unwrap_or(config.query.default_hours),
        search: args.search,
        realtime: args.realtime,
    };
    let per_page = args.per_page.unwrap_or(config.query.default_page_size);
    let page = engine.list(&filter, args.page, per_page).await;

    writer.render(&EventListReport { page })?;
    Ok(())
}

/// Single event lookup result. "Not found" is an outcome, not an error.
#[derive(Serialize)]
struct EventLookupReport {
    id: String,
    found: Option<EventRecord>,
}

impl Render for EventLookupReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        match &self.found {
            Some(event) => writeln!(w, "{event}"),
            None => writeln!(w, "Event not found: {}", self.id),
        }
    }
}

/// Paginated event list.
#[derive(Serialize)]
struct EventListReport {
    #[serde(flatten)]
    page: EventPage,
}

impl Render for EventListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "{:<20} {:<16} {:<9} {:<14} {:<12} Command",
            "Timestamp", "Type", "Severity", "Hostname", "User"
        )?;
        writeln!(w, "{}", "-".repeat(92))?;
        for event in &self.page.events {
            writeln!(
                w,
                "{:<20} {:<16} {:<9} {:<14} {:<12} {}",
                event.timestamp(),
                event.event_type(),
                event.severity(),
                event.hostname(),
                event.user(),
                event.command(),
            )?;
        }
        writeln!(
            w,
            "page {}/{} ({} events total)",
            self.page.page, self.page.pages, self.page.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_report_renders_not_found() {
        let report = EventLookupReport {
            id: "ev-99".to_owned(),
            found: None,
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render succeeds");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Event not found: ev-99"));
    }

    #[test]
    fn list_report_renders_rows_and_footer() {
        let report = EventListReport {
            page: EventPage {
                events: vec![
                    EventRecord::new()
                        .with("timestamp", "2026-08-29T10:00:00")
                        .with("event_type", "user_login")
                        .with("user", "alice"),
                ],
                total: 1,
                page: 1,
                per_page: 50,
                pages: 1,
            },
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render succeeds");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("user_login"));
        assert!(output.contains("page 1/1 (1 events total)"));
    }
}

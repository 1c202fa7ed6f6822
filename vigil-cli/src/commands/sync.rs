//! `vigil sync` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use vigil_core::config::VigilConfig;
use vigil_events::Synchronizer;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `sync` command.
///
/// Reads the full local event log and uploads records not yet present
/// in the remote store. Per-record failures are logged and skipped by
/// the synchronizer itself; this command only reports the final count.
pub async fn execute(config: &VigilConfig, writer: &OutputWriter) -> Result<(), CliError> {
    info!(
        log_file = %config.events.log_file,
        store = %config.store.addr(),
        "starting event synchronization"
    );

    let added = Synchronizer::from_config(config).sync().await;

    writer.render(&SyncReport { added })?;
    Ok(())
}

/// Result of a synchronization run.
#[derive(Serialize)]
struct SyncReport {
    added: u64,
}

impl Render for SyncReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Synced {} new events to store", self.added)
    }
}

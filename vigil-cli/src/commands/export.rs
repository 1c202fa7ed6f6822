//! `vigil export` command handler

use std::io::Write;

use tracing::info;

use vigil_core::config::VigilConfig;
use vigil_events::export::{ExportFormat, export_events};
use vigil_events::source::EventSource;

use crate::cli::ExportArgs;
use crate::error::CliError;

/// Execute the `export` command.
///
/// Exports always read the full merged source (log with store fallback)
/// and apply only the recency window. The serialized body goes to the
/// given file, or to stdout as-is -- the `--output` format flag does not
/// apply here since the body already has a format of its own.
pub async fn execute(args: ExportArgs, config: &VigilConfig) -> Result<(), CliError> {
    let format = ExportFormat::from_name(&args.format);
    let hours = args.hours.unwrap_or(config.query.default_hours);

    let source = EventSource::from_config(config);
    let payload = export_events(&source, hours, format).await?;

    match args.out {
        Some(path) => {
            tokio::fs::write(&path, payload.body.as_bytes()).await?;
            info!(
                path = %path.display(),
                mime = payload.mime,
                bytes = payload.body.len(),
                "export written"
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(payload.body.as_bytes())?;
            writeln!(handle)?;
        }
    }
    Ok(())
}

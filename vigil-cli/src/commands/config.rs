//! `vigil config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use vigil_core::config::VigilConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Attempt to load and validate the configuration file, reporting any errors.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match VigilConfig::load(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

/// Load and display the effective configuration (file + env overrides +
/// defaults). A missing file shows the defaults rather than failing, since
/// the dashboard runs without a configuration file.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = crate::load_or_default(config_path).await?;

    let report = match section.as_deref() {
        None => ConfigReport {
            source: config_path.display().to_string(),
            section: None,
            config_toml: to_toml(&config),
        },
        Some("general") => section_report(config_path, "general", &config.general),
        Some("store") => section_report(config_path, "store", &config.store),
        Some("events") => section_report(config_path, "events", &config.events),
        Some("query") => section_report(config_path, "query", &config.query),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown config section '{other}' (expected: general, store, events, query)"
            )));
        }
    };

    writer.render(&report)?;
    Ok(())
}

fn section_report(config_path: &Path, name: &str, section: &impl Serialize) -> ConfigReport {
    ConfigReport {
        source: config_path.display().to_string(),
        section: Some(name.to_owned()),
        config_toml: to_toml(section),
    }
}

fn to_toml(value: &impl Serialize) -> String {
    toml::to_string_pretty(value).unwrap_or_else(|e| format!("(serialization error: {e})"))
}

/// Validation outcome for `config validate`.
#[derive(Serialize)]
struct ConfigValidationReport {
    source: String,
    valid: bool,
    errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Configuration: {}", self.source)?;
        if self.valid {
            writeln!(w, "Status: valid")?;
        } else {
            writeln!(w, "Status: INVALID")?;
            for error in &self.errors {
                writeln!(w, "  - {error}")?;
            }
        }
        Ok(())
    }
}

/// Effective configuration dump for `config show`.
#[derive(Serialize)]
struct ConfigReport {
    source: String,
    section: Option<String>,
    config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Configuration: {}", self.source)?;
        if let Some(section) = &self.section {
            writeln!(w, "Section: [{section}]")?;
        }
        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_report_renders_errors() {
        let report = ConfigValidationReport {
            source: "vigil.toml".to_owned(),
            valid: false,
            errors: vec!["store.port must not be 0".to_owned()],
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render succeeds");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("INVALID"));
        assert!(output.contains("store.port must not be 0"));
    }

    #[test]
    fn section_report_serializes_store_section() {
        let config = VigilConfig::default();
        let report = section_report(Path::new("vigil.toml"), "store", &config.store);
        assert_eq!(report.section.as_deref(), Some("store"));
        assert!(report.config_toml.contains("host"));
        assert!(report.config_toml.contains("8080"));
    }
}

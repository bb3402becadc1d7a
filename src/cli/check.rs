//! Check command implementation

use crate::cli::output::{format_entries_json, format_entries_table, EntryView};
use crate::cli::CheckArgs;
use crate::config::{ConfigError, FactoryConfig};
use crate::factory::DbFactory;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Outcome of ingesting and connecting every configured backend.
#[derive(Debug)]
pub struct CheckReport {
    pub entries: Vec<EntryView>,
    /// Why the connect sweep stopped, if it did.
    pub error: Option<String>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(args: &CheckArgs) -> Result<FactoryConfig, ConfigError> {
    let mut config = FactoryConfig::load_layered(args.config.as_deref())?.with_env_overrides();

    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Ingest `config` into `factory` and connect everything.
///
/// Ingestion errors are returned; a connect failure is recorded in the report
/// so the state of every entry can still be shown. Connections are left open.
pub async fn check_factory(
    config: &FactoryConfig,
    factory: &DbFactory,
) -> Result<CheckReport, ConfigError> {
    config.ingest(factory).await?;

    let (error, failed) = match factory.connect_all().await {
        Ok(_) => (None, None),
        Err(e) => (Some(e.to_string()), e.name().map(str::to_string)),
    };

    let entries = factory
        .status()
        .await
        .iter()
        .map(|status| EntryView::new(status, failed.as_deref()))
        .collect();

    Ok(CheckReport { entries, error })
}

/// Render a report the way `--json` asks for.
pub fn render_report(report: &CheckReport, json: bool) -> serde_json::Result<String> {
    if json {
        format_entries_json(&report.entries, report.error.as_deref())
    } else if report.entries.is_empty() {
        Ok("No databases configured".to_string())
    } else {
        Ok(format_entries_table(&report.entries))
    }
}

/// Handle `dbfactory check` command
pub async fn run_check(args: &CheckArgs, config: &FactoryConfig) -> anyhow::Result<()> {
    let factory = Arc::new(DbFactory::new());
    let report = check_factory(config, &factory).await?;

    println!("{}", render_report(&report, args.json)?);

    if args.wait && report.is_ok() {
        tracing::info!("Connections open, waiting for shutdown signal");
        let closer = Arc::clone(&factory).spawn_close_on_shutdown(CancellationToken::new());
        closer.await?;
    } else {
        factory.close_all().await;
    }

    match report.error {
        Some(error) => anyhow::bail!(error),
        None => Ok(()),
    }
}

//! `ctfd-setup setup` — bootstrap or update an instance.

use anyhow::{Context, Result};
use clap::Args;

use ctfd_setup_core::Secret;
use ctfd_setup_sync::{HttpConnector, PageAction, Reconciler, SetupReport, UploadOutcome};

use super::{parse_secret, ConfigArgs};

/// Arguments for `ctfd-setup setup`.
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Base URL of the CTFd instance.
    #[arg(long, env = "CTFD_URL")]
    pub url: String,

    /// Admin API token. Skips the login step on provisioned instances.
    #[arg(long, env = "CTFD_API_KEY", hide_env_values = true, value_parser = parse_secret)]
    pub api_key: Option<Secret>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl SetupArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.load()?;
        tracing::info!(url = %self.url, name = %config.appearance.name, "starting setup");
        let connector = HttpConnector::new(&self.url).context("failed to build HTTP client")?;
        let api_key = self
            .api_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .map(Secret::expose);

        let report = Reconciler::with_tracing(connector)
            .setup(api_key, &config)
            .with_context(|| format!("setup failed for {}", self.url))?;
        print_report(&self.url, &report);
        Ok(())
    }
}

fn print_report(url: &str, report: &SetupReport) {
    if report.bootstrapped {
        println!("✓ '{url}' bootstrapped from bare state");
    }

    let changed = report.changes();
    let unchanged = report
        .uploads
        .iter()
        .filter(|u| matches!(u, UploadOutcome::Unchanged { .. }))
        .count();
    if changed == 0 {
        println!("✓ '{url}' — settings patched, nothing else to do");
    } else {
        println!("✓ '{url}' reconciled ({changed} changed, {unchanged} unchanged)");
    }

    for action in &report.pages {
        let symbol = match action {
            PageAction::Created { .. } => "✎",
            PageAction::Updated { .. } => "~",
            PageAction::Deleted { .. } => "✗",
        };
        println!("  {symbol}  page {}", action.route());
    }
    for outcome in &report.uploads {
        let symbol = match outcome {
            UploadOutcome::Uploaded { .. } => "↑",
            UploadOutcome::Unchanged { .. } => "·",
        };
        println!("  {symbol}  file {}", outcome.location());
    }
}

//! `ctfd-setup probe` — bare or provisioned.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use ctfd_setup_sync::{Connector, HttpConnector};

/// Arguments for `ctfd-setup probe`.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Base URL of the CTFd instance.
    #[arg(long, env = "CTFD_URL")]
    pub url: String,
}

impl ProbeArgs {
    pub fn run(self) -> Result<()> {
        let connector = HttpConnector::new(&self.url).context("failed to build HTTP client")?;
        let bare = connector
            .is_bare()
            .with_context(|| format!("probing setup state of {}", self.url))?;

        let label = if bare {
            "BARE".yellow().bold()
        } else {
            "PROVISIONED".green().bold()
        };
        println!("{label} {}", connector.url());
        Ok(())
    }
}

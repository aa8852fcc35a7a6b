//! `ctfd-setup validate` — offline check of the configuration.

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use ctfd_setup_core::Config;
use ctfd_setup_sync::uploads::sha1_hex;

use super::ConfigArgs;

/// Arguments for `ctfd-setup validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Tabled)]
struct PageRow {
    #[tabled(rename = "route")]
    route: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "format")]
    format: String,
    #[tabled(rename = "flags")]
    flags: String,
}

#[derive(Tabled)]
struct UploadRow {
    #[tabled(rename = "location")]
    location: String,
    #[tabled(rename = "bytes")]
    bytes: usize,
    #[tabled(rename = "sha1")]
    sha1: String,
}

impl ValidateArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.load()?;
        config.validate().context("configuration is not valid")?;

        println!(
            "✓ '{}' is valid ({} mode, theme {})",
            config.appearance.name, config.mode, config.theme.name
        );
        print_pages(&config);
        print_uploads(&config);
        Ok(())
    }
}

fn flags(page: &ctfd_setup_core::Page) -> String {
    let flags: Vec<&str> = [
        (page.draft, "draft"),
        (page.hidden, "hidden"),
        (page.auth_required, "auth"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect();
    flags.join(",")
}

fn print_pages(config: &Config) {
    if config.pages.additional.is_empty() {
        println!("No pages declared; remote pages will be left alone.");
        return;
    }
    let rows: Vec<PageRow> = config
        .pages
        .additional
        .iter()
        .map(|page| PageRow {
            route: page.route.clone(),
            title: page.title.clone(),
            format: page.format.to_string(),
            flags: flags(page),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn print_uploads(config: &Config) {
    if config.uploads.is_empty() {
        return;
    }
    let rows: Vec<UploadRow> = config
        .uploads
        .iter()
        .map(|upload| UploadRow {
            location: upload.location.clone(),
            bytes: upload.file.content().len(),
            sha1: sha1_hex(upload.file.content()),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

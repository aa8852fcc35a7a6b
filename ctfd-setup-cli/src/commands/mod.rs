//! Subcommands and the configuration arguments they share.

pub mod probe;
pub mod setup;
pub mod validate;

use std::convert::Infallible;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ctfd_setup_core::{config, Config, Mode, Secret};

pub(crate) fn parse_secret(value: &str) -> std::result::Result<Secret, Infallible> {
    Ok(Secret::new(value))
}

fn parse_mode(value: &str) -> std::result::Result<Mode, String> {
    match value.to_ascii_lowercase().as_str() {
        "users" => Ok(Mode::Users),
        "teams" => Ok(Mode::Teams),
        other => Err(format!("unknown mode '{other}'; expected: users, teams")),
    }
}

/// Where the configuration comes from, and the fields that may override it.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration document. Without it a built-in default is used and the
    /// required fields must come from the overrides.
    #[arg(long, env = "FILE")]
    pub file: Option<PathBuf>,

    /// Base directory for relative `from_file` sources (default: the
    /// document's directory).
    #[arg(long, env = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    #[arg(long = "appearance.name", env = "APPEARANCE_NAME")]
    pub appearance_name: Option<String>,

    #[arg(long = "appearance.description", env = "APPEARANCE_DESCRIPTION")]
    pub appearance_description: Option<String>,

    #[arg(long = "admin.name", env = "ADMIN_NAME")]
    pub admin_name: Option<String>,

    #[arg(long = "admin.email", env = "ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    #[arg(
        long = "admin.password",
        env = "ADMIN_PASSWORD",
        hide_env_values = true,
        value_parser = parse_secret
    )]
    pub admin_password: Option<Secret>,

    /// users or teams.
    #[arg(long, env = "MODE", value_parser = parse_mode)]
    pub mode: Option<Mode>,
}

impl ConfigArgs {
    /// Load (or default) the document, resolve its sources and apply the
    /// overrides. Validation is left to the caller.
    pub fn load(&self) -> Result<Config> {
        let mut config = match &self.file {
            Some(path) => config::load_at(path, self.directory.as_deref())
                .with_context(|| format!("failed to load configuration {}", path.display()))?,
            None => {
                let base = match &self.directory {
                    Some(dir) => dir.clone(),
                    None => std::env::current_dir()
                        .context("could not determine current directory")?,
                };
                config::load_default(&base).context("failed to load default configuration")?
            }
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(name) = &self.appearance_name {
            config.appearance.name = name.clone();
        }
        if let Some(description) = &self.appearance_description {
            config.appearance.description = description.clone();
        }
        if let Some(name) = &self.admin_name {
            config.admin.name = name.clone();
        }
        if let Some(email) = &self.admin_email {
            config.admin.email = email.clone();
        }
        if let Some(password) = &self.admin_password {
            config.admin.password = password.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
    }
}

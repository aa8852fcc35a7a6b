//! Loading, resolution and validation of the configuration document.
//!
//! # Load pipeline
//!
//! ```text
//! YAML text ──parse──▶ Config (sources pending) ──resolve──▶ Config (plain values)
//! ```
//!
//! Validation is a separate step so that callers can apply overrides (CLI
//! flags, environment) between resolution and validation.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{io_err, ConfigError, Problem, ValidationError};
use crate::types::Config;

/// Document used when no configuration file is given. Required fields are
/// left empty and must come from overrides.
pub const DEFAULT_DOCUMENT: &str = r#"
appearance:
  name: ""
  description: ""
theme:
  name: core
mode: users
settings:
  challenge_visibility: public
  account_visibility: public
  score_visibility: public
  registration_visibility: public
accounts:
  verify_emails: false
"#;

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

/// Load and resolve the configuration at `path`.
///
/// Relative `from_file` sources are joined to `base_dir`, or to the parent
/// directory of `path` when `base_dir` is `None`.
///
/// Returns `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path, base_dir: Option<&Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let mut config: Config = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    let base_dir = match base_dir {
        Some(dir) => dir,
        None => path.parent().unwrap_or_else(|| Path::new(".")),
    };
    config.resolve(base_dir)?;
    Ok(config)
}

/// Parse and resolve an in-memory document.
pub fn parse_str(yaml: &str, base_dir: &Path) -> Result<Config, ConfigError> {
    let mut config: Config = serde_yaml::from_str(yaml)?;
    config.resolve(base_dir)?;
    Ok(config)
}

/// Parse the built-in [`DEFAULT_DOCUMENT`].
pub fn load_default(base_dir: &Path) -> Result<Config, ConfigError> {
    parse_str(DEFAULT_DOCUMENT, base_dir)
}

// ---------------------------------------------------------------------------
// 2. Resolve
// ---------------------------------------------------------------------------

impl Config {
    /// Resolve every secret and file source exactly once.
    pub fn resolve(&mut self, base_dir: &Path) -> Result<(), ConfigError> {
        let theme = &mut self.theme;
        for file in [
            &mut theme.logo,
            &mut theme.small_icon,
            &mut theme.header,
            &mut theme.footer,
            &mut theme.settings,
            &mut self.pages.robots_txt,
            &mut self.social.template,
            &mut self.legal.tos.content,
            &mut self.legal.privacy_policy.content,
        ]
        .into_iter()
        .flatten()
        {
            file.resolve(base_dir)?;
        }

        for page in &mut self.pages.additional {
            page.content.resolve(base_dir)?;
        }
        for upload in &mut self.uploads {
            upload.file.resolve(base_dir)?;
        }

        self.admin.password.resolve(base_dir)?;
        if let Some(password) = self.email.password.as_mut() {
            password.resolve(base_dir)?;
        }
        if let Some(secret) = self.major_league_cyber.client_secret.as_mut() {
            secret.resolve(base_dir)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // 3. Validate
    // -----------------------------------------------------------------------

    /// Check required fields and uniqueness keys.
    ///
    /// Collects every problem before failing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();

        let required = [
            ("appearance.name", self.appearance.name.is_empty()),
            ("appearance.description", self.appearance.description.is_empty()),
            ("admin.name", self.admin.name.is_empty()),
            ("admin.email", self.admin.email.is_empty()),
            ("admin.password", self.admin.password.is_empty()),
        ];
        for (field, missing) in required {
            if missing {
                problems.push(Problem::Missing(field));
            }
        }

        let mut routes = HashSet::new();
        for (i, page) in self.pages.additional.iter().enumerate() {
            if page.route.is_empty() {
                problems.push(Problem::Empty(format!("pages.additional[{i}].route")));
            } else if !routes.insert(page.route.as_str()) {
                problems.push(Problem::DuplicateRoute(page.route.clone()));
            }
        }

        let mut locations = HashSet::new();
        for (i, upload) in self.uploads.iter().enumerate() {
            if upload.location.is_empty() {
                problems.push(Problem::Empty(format!("uploads[{i}].location")));
            } else if !locations.insert(upload.location.as_str()) {
                problems.push(Problem::DuplicateLocation(upload.location.clone()));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { problems })
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

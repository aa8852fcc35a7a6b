//! Domain types for the declarative CTFd configuration.
//!
//! Every section defaults, so a document only needs the keys it sets.
//! Scalar settings the operator may leave alone are `Option<T>`: `None` is
//! "leave the remote value untouched", never "set it to zero".

use std::fmt;

use serde::Deserialize;

use crate::source::{File, Secret};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Whether players compete alone or in teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Users,
    Teams,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Users => "users",
            Mode::Teams => "teams",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Markup language of a page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    Markdown,
    Html,
}

impl PageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageFormat::Markdown => "markdown",
            PageFormat::Html => "html",
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Appearance {
    pub name: String,
    pub description: String,
    pub default_locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Theme {
    pub name: String,
    pub logo: Option<File>,
    pub small_icon: Option<File>,
    pub header: Option<File>,
    pub footer: Option<File>,
    /// Theme settings JSON document.
    pub settings: Option<File>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "core".to_string(),
            logo: None,
            small_icon: None,
            header: None,
            footer: None,
            settings: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Accounts {
    pub domain_whitelist: Option<String>,
    pub domain_blacklist: Option<String>,
    pub verify_emails: bool,
    pub team_creation: Option<bool>,
    pub team_size: Option<u32>,
    pub num_teams: Option<u32>,
    pub num_users: Option<u32>,
    pub team_disbanding: Option<String>,
    pub incorrect_submissions_per_minute: Option<u32>,
    pub name_changes: Option<bool>,
    pub password_min_length: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Challenges {
    pub view_self_submission: Option<bool>,
    pub max_attempts_behavior: Option<String>,
    pub max_attempts_timeout: Option<u32>,
    pub hints_free_public_access: Option<bool>,
    pub challenge_ratings: Option<String>,
}

/// A custom page served by the instance, keyed by `route`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Page {
    pub title: String,
    pub route: String,
    pub format: PageFormat,
    pub content: File,
    pub draft: bool,
    pub hidden: bool,
    pub auth_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Pages {
    pub robots_txt: Option<File>,
    pub additional: Vec<Page>,
}

/// OAuth federation through MajorLeagueCyber.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct MajorLeagueCyber {
    pub client_id: Option<String>,
    pub client_secret: Option<Secret>,
}

/// Visibility settings. The four visibilities are always pushed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub challenge_visibility: String,
    pub account_visibility: String,
    pub score_visibility: String,
    pub registration_visibility: String,
    pub paused: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            challenge_visibility: "public".to_string(),
            account_visibility: "public".to_string(),
            score_visibility: "public".to_string(),
            registration_visibility: "public".to_string(),
            paused: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Security {
    pub html_sanitization: Option<bool>,
    pub registration_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct EmailContent {
    pub subject: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Email {
    pub registration: EmailContent,
    pub confirmation: EmailContent,
    pub new_account: EmailContent,
    pub password_reset: EmailContent,
    pub password_reset_confirmation: EmailContent,
    pub server: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<Secret>,
    pub tls_ssl: Option<bool>,
    pub starttls: Option<bool>,
}

/// Event window. Timestamps are passed to the instance as written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Time {
    pub start: Option<String>,
    pub end: Option<String>,
    pub freeze: Option<String>,
    pub view_after: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Social {
    pub shares: Option<bool>,
    pub template: Option<File>,
}

/// A legal document: a link, inline text, or both.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalReference {
    pub url: Option<String>,
    pub content: Option<File>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Legal {
    pub tos: ExternalReference,
    pub privacy_policy: ExternalReference,
}

/// The administrator account, set once when the instance is bootstrapped.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Admin {
    pub name: String,
    pub email: String,
    pub password: Secret,
}

/// A file stored on the instance at a fixed location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Upload {
    pub file: File,
    pub location: String,
}

// ---------------------------------------------------------------------------
// Root
// ---------------------------------------------------------------------------

/// Root of the declarative configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub appearance: Appearance,
    pub theme: Theme,
    pub accounts: Accounts,
    pub challenges: Challenges,
    pub pages: Pages,
    pub major_league_cyber: MajorLeagueCyber,
    pub settings: Settings,
    pub security: Security,
    pub email: Email,
    pub time: Time,
    pub social: Social,
    pub legal: Legal,
    pub admin: Admin,
    pub mode: Mode,
    pub uploads: Vec<Upload>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

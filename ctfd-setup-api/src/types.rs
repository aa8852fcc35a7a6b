//! Request and response payloads of the CTFd API.
//!
//! Payloads carrying credentials do not derive `Debug`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Anonymous (or authenticated) browser session: cookie value plus the CSRF
/// nonce bound to it.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub nonce: String,
    pub session: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("nonce", &self.nonce)
            .field("session", &"[REDACTED]")
            .finish()
    }
}

/// Fields of the one-shot `/setup` wizard.
#[derive(Clone, PartialEq, Eq)]
pub struct SetupParams {
    pub ctf_name: String,
    pub ctf_description: String,
    pub user_mode: String,
    pub ctf_theme: String,
    pub challenge_visibility: String,
    pub account_visibility: String,
    pub score_visibility: String,
    pub registration_visibility: String,
    pub verify_emails: bool,
    pub team_size: Option<u32>,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SetupParams {
    /// Form fields as posted by the setup wizard.
    pub(crate) fn form(&self, nonce: &str) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("ctf_name", self.ctf_name.clone()),
            ("ctf_description", self.ctf_description.clone()),
            ("user_mode", self.user_mode.clone()),
            ("ctf_theme", self.ctf_theme.clone()),
            ("challenge_visibility", self.challenge_visibility.clone()),
            ("account_visibility", self.account_visibility.clone()),
            ("score_visibility", self.score_visibility.clone()),
            ("registration_visibility", self.registration_visibility.clone()),
            ("verify_emails", self.verify_emails.to_string()),
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("password", self.password.clone()),
            ("nonce", nonce.to_string()),
            ("_submit", "Finish".to_string()),
        ];
        if let Some(size) = self.team_size {
            form.push(("team_size", size.to_string()));
        }
        form
    }
}

impl fmt::Debug for SetupParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupParams")
            .field("ctf_name", &self.ctf_name)
            .field("user_mode", &self.user_mode)
            .field("ctf_theme", &self.ctf_theme)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Bulk `PATCH /api/v1/configs` body.
///
/// `None` fields are omitted from the JSON so the remote value is left as is.
/// Text fields backed by files are plain `String`s: CTFd stores them as
/// replaceable strings, so they are always sent.
#[derive(Clone, Default, Serialize)]
pub struct ConfigsPatch {
    pub ctf_name: String,
    pub ctf_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,
    pub ctf_theme: String,
    pub theme_header: String,
    pub theme_footer: String,
    pub theme_settings: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_whitelist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_blacklist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incorrect_submissions_per_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_changes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_teams: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_users: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_creation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_disbanding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_min_length: Option<u32>,
    pub verify_emails: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_self_submissions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts_behavior: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints_free_public_access: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_ratings: Option<String>,

    pub robots_txt: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_client_secret: Option<String>,

    pub account_visibility: String,
    pub challenge_visibility: String,
    pub registration_visibility: String,
    pub score_visibility: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_sanitization: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_code: Option<String>,

    #[serde(rename = "mail_useauth", skip_serializing_if = "Option::is_none")]
    pub mail_use_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_ssl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_tls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successful_registration_email_subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successful_registration_email_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_email_subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_email_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_creation_email_subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_creation_email_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_change_alert_subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_change_alert_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_reset_subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_reset_body: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeze: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_after_ctf: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_shares: Option<bool>,
    pub social_shares_template: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_url: Option<String>,
    pub privacy_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tos_url: Option<String>,
    pub tos_text: String,

    pub user_mode: String,
}

/// Body of `POST /api/v1/pages` and `PATCH /api/v1/pages/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageParams {
    pub title: String,
    pub route: String,
    pub format: String,
    pub content: String,
    pub draft: bool,
    pub hidden: bool,
    pub auth_required: bool,
}

/// A page as stored by the instance.
///
/// The list endpoint may omit `content`; fetch the page by id to get it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Page {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub route: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub hidden: Option<bool>,
    #[serde(default)]
    pub auth_required: Option<bool>,
}

/// A file stored by the instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFile {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub location: String,
    #[serde(default)]
    pub sha1sum: Option<String>,
}

/// A file to upload.
#[derive(Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputFile")
            .field("name", &self.name)
            .field("len", &self.content.len())
            .finish()
    }
}

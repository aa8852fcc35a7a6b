//! Mapping from the configuration document to CTFd setting payloads.

use ctfd_setup_api::{ConfigsPatch, SetupParams};
use ctfd_setup_core::{Config, Email, File};

/// Fields accepted by the one-shot setup wizard.
pub fn setup_params(config: &Config) -> SetupParams {
    let settings = &config.settings;
    SetupParams {
        ctf_name: config.appearance.name.clone(),
        ctf_description: config.appearance.description.clone(),
        user_mode: config.mode.as_str().to_string(),
        ctf_theme: config.theme.name.clone(),
        challenge_visibility: settings.challenge_visibility.clone(),
        account_visibility: settings.account_visibility.clone(),
        score_visibility: settings.score_visibility.clone(),
        registration_visibility: settings.registration_visibility.clone(),
        verify_emails: config.accounts.verify_emails,
        team_size: config.accounts.team_size,
        name: config.admin.name.clone(),
        email: config.admin.email.clone(),
        password: config.admin.password.expose().to_string(),
    }
}

fn text(file: &Option<File>) -> String {
    file.as_ref().map(File::text).unwrap_or_default()
}

/// Mail credentials are sent as a pair or not at all.
fn mail_auth(email: &Email) -> (Option<bool>, Option<String>, Option<String>) {
    let username = email.username.as_deref().filter(|u| !u.is_empty());
    let password = email.password.as_ref().filter(|p| !p.is_empty());
    match (username, password) {
        (Some(username), Some(password)) => (
            Some(true),
            Some(username.to_string()),
            Some(password.expose().to_string()),
        ),
        _ => (None, None, None),
    }
}

/// Bulk settings patch carrying every declared field.
pub fn configs_patch(config: &Config) -> ConfigsPatch {
    let Config {
        appearance,
        theme,
        accounts,
        challenges,
        pages,
        major_league_cyber: mlc,
        settings,
        security,
        email,
        time,
        social,
        legal,
        mode,
        ..
    } = config;
    let (mail_use_auth, mail_username, mail_password) = mail_auth(email);

    ConfigsPatch {
        ctf_name: appearance.name.clone(),
        ctf_description: appearance.description.clone(),
        default_locale: appearance.default_locale.clone(),
        ctf_theme: theme.name.clone(),
        theme_header: text(&theme.header),
        theme_footer: text(&theme.footer),
        theme_settings: text(&theme.settings),

        domain_whitelist: accounts.domain_whitelist.clone(),
        domain_blacklist: accounts.domain_blacklist.clone(),
        incorrect_submissions_per_min: accounts.incorrect_submissions_per_minute,
        name_changes: accounts.name_changes,
        num_teams: accounts.num_teams,
        num_users: accounts.num_users,
        team_creation: accounts.team_creation,
        team_disbanding: accounts.team_disbanding.clone(),
        team_size: accounts.team_size,
        password_min_length: accounts.password_min_length,
        verify_emails: accounts.verify_emails,

        view_self_submissions: challenges.view_self_submission,
        max_attempts_behavior: challenges.max_attempts_behavior.clone(),
        max_attempts_timeout: challenges.max_attempts_timeout,
        hints_free_public_access: challenges.hints_free_public_access,
        challenge_ratings: challenges.challenge_ratings.clone(),

        robots_txt: text(&pages.robots_txt),

        oauth_client_id: mlc.client_id.clone(),
        oauth_client_secret: mlc.client_secret.as_ref().map(|s| s.expose().to_string()),

        account_visibility: settings.account_visibility.clone(),
        challenge_visibility: settings.challenge_visibility.clone(),
        registration_visibility: settings.registration_visibility.clone(),
        score_visibility: settings.score_visibility.clone(),
        paused: settings.paused,

        html_sanitization: security.html_sanitization,
        registration_code: security.registration_code.clone(),

        mail_use_auth,
        mail_username,
        mail_password,
        mail_server: email.server.clone(),
        mail_port: email.port,
        mail_ssl: email.tls_ssl,
        mail_tls: email.starttls,
        successful_registration_email_subject: email.registration.subject.clone(),
        successful_registration_email_body: email.registration.body.clone(),
        verification_email_subject: email.confirmation.subject.clone(),
        verification_email_body: email.confirmation.body.clone(),
        user_creation_email_subject: email.new_account.subject.clone(),
        user_creation_email_body: email.new_account.body.clone(),
        // The reset link mail is CTFd's `password_reset`, the notice sent
        // after a successful change is its `password_change_alert`.
        password_change_alert_subject: email.password_reset_confirmation.subject.clone(),
        password_change_alert_body: email.password_reset_confirmation.body.clone(),
        password_reset_subject: email.password_reset.subject.clone(),
        password_reset_body: email.password_reset.body.clone(),

        start: time.start.clone(),
        end: time.end.clone(),
        freeze: time.freeze.clone(),
        view_after_ctf: time.view_after,

        social_shares: social.shares,
        social_shares_template: text(&social.template),

        privacy_url: legal.privacy_policy.url.clone(),
        privacy_text: text(&legal.privacy_policy.content),
        tos_url: legal.tos.url.clone(),
        tos_text: text(&legal.tos.content),

        user_mode: mode.as_str().to_string(),
    }
}

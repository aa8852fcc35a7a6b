//! Anonymous browser session bootstrap: session cookie plus CSRF nonce.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{HeaderMap, COOKIE, LOCATION, SET_COOKIE};
use reqwest::Url;

use crate::error::ClientError;
use crate::types::Session;

/// Redirect hops followed before giving up.
const MAX_HOPS: usize = 5;

fn nonce_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"csrfNonce['"]?\s*:\s*"([A-Za-z0-9]+)""#).expect("nonce pattern compiles")
    })
}

/// Pull the CSRF nonce out of a rendered CTFd page.
pub fn extract_nonce(body: &str) -> Option<String> {
    nonce_pattern()
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Value of the `session` cookie set by a response, if any.
pub(crate) fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie| cookie.strip_prefix("session="))
        .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
}

/// Open an anonymous session against `url`.
///
/// Starts at `/setup`, which renders the wizard on a bare instance and
/// redirects elsewhere on a provisioned one. Redirects are followed by hand
/// so the session cookie is carried between hops.
pub fn get_nonce_and_session(http: &HttpClient, url: &str) -> Result<Session, ClientError> {
    let base = url.trim_end_matches('/');
    let mut target = format!("{base}/setup");
    let mut session: Option<String> = None;

    for _ in 0..MAX_HOPS {
        let mut request = http.get(&target);
        if let Some(value) = &session {
            request = request.header(COOKIE, format!("session={value}"));
        }
        let response = request
            .send()
            .map_err(|e| ClientError::transport(&target, e))?;
        if let Some(value) = session_cookie(response.headers()) {
            session = Some(value);
        }

        if response.status().is_redirection() {
            target = next_hop(&target, &response)?;
            continue;
        }
        if !response.status().is_success() {
            return Err(ClientError::Status {
                endpoint: target,
                status: response.status().as_u16(),
                body: String::new(),
            });
        }

        let body = response
            .text()
            .map_err(|e| ClientError::transport(&target, e))?;
        let nonce = extract_nonce(&body)
            .ok_or_else(|| ClientError::protocol(&target, "no CSRF nonce in page"))?;
        let session =
            session.ok_or_else(|| ClientError::protocol(&target, "no session cookie set"))?;
        tracing::debug!(endpoint = %target, "opened CTFd session");
        return Ok(Session { nonce, session });
    }

    Err(ClientError::protocol(&target, "too many redirects"))
}

fn next_hop(current: &str, response: &Response) -> Result<String, ClientError> {
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ClientError::protocol(current, "redirect without Location"))?;
    let base = Url::parse(current).map_err(|e| ClientError::protocol(current, e.to_string()))?;
    let next = base
        .join(location)
        .map_err(|e| ClientError::protocol(current, e.to_string()))?;
    Ok(next.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn nonce_is_found_in_both_quoting_styles() {
        let js = r#"<script>var init = { 'urlRoot': "", 'csrfNonce': "a1B2c3", };</script>"#;
        assert_eq!(extract_nonce(js).as_deref(), Some("a1B2c3"));

        let bare = r#"window.init = { csrfNonce: "ffff0000" }"#;
        assert_eq!(extract_nonce(bare).as_deref(), Some("ffff0000"));
    }

    #[test]
    fn missing_nonce_is_none() {
        assert_eq!(extract_nonce("<html></html>"), None);
    }

    #[test]
    fn session_cookie_ignores_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("theme=dark; Path=/"));
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("session=abc.def; HttpOnly; Path=/"),
        );
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc.def"));
    }
}

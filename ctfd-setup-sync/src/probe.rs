//! Bare-instance detection.

use reqwest::blocking::Client as HttpClient;
use reqwest::StatusCode;

use ctfd_setup_api::ClientError;

/// Whether the instance at `url` still serves its setup wizard.
///
/// `http` must not follow redirects: a provisioned instance answers
/// `GET /setup` with a redirect, a bare one with `200 OK`. Any other status
/// is an error rather than a guess.
pub fn is_bare(http: &HttpClient, url: &str) -> Result<bool, ClientError> {
    let endpoint = format!("{}/setup", url.trim_end_matches('/'));
    let response = http
        .get(&endpoint)
        .send()
        .map_err(|source| ClientError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;

    let status = response.status();
    if status == StatusCode::OK {
        tracing::debug!(endpoint = %endpoint, "instance is bare");
        Ok(true)
    } else if status.is_redirection() {
        tracing::debug!(endpoint = %endpoint, status = status.as_u16(), "instance is provisioned");
        Ok(false)
    } else {
        Err(ClientError::Status {
            endpoint,
            status: status.as_u16(),
            body: String::new(),
        })
    }
}

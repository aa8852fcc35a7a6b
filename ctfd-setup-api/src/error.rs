//! Error types for ctfd-setup-api.

use thiserror::Error;

/// Failure talking to the CTFd instance.
///
/// Every message starts with `client error` so remote failures are easy to
/// tell apart from local ones in a chained error report.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, TLS, connection reset, ...).
    #[error("client error: request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The instance answered with a status the call does not accept.
    #[error("client error: {endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The instance answered but refused the operation (`success: false`,
    /// login form re-rendered, ...).
    #[error("client error: {endpoint} rejected the request: {detail}")]
    Rejected { endpoint: String, detail: String },

    /// The response could not be understood.
    #[error("client error: unexpected response from {endpoint}: {detail}")]
    Protocol { endpoint: String, detail: String },
}

impl ClientError {
    pub(crate) fn transport(endpoint: &str, source: reqwest::Error) -> Self {
        ClientError::Transport {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub(crate) fn protocol(endpoint: &str, detail: impl Into<String>) -> Self {
        ClientError::Protocol {
            endpoint: endpoint.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn rejected(endpoint: &str, detail: impl Into<String>) -> Self {
        ClientError::Rejected {
            endpoint: endpoint.to_string(),
            detail: detail.into(),
        }
    }
}

//! Error types for ctfd-setup-sync.

use std::fmt;

use thiserror::Error;

use ctfd_setup_api::ClientError;
use ctfd_setup_core::ValidationError;

/// All errors a reconciliation pass can return.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A gateway call failed; `context` names the phase (and item) it
    /// belonged to.
    #[error("{context}: {source}")]
    Client {
        context: String,
        #[source]
        source: ClientError,
    },

    /// The configuration was rejected before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// One or more uploads failed; the others were still attempted.
    #[error(transparent)]
    Uploads(#[from] UploadErrors),
}

impl SetupError {
    /// Prefix the context of a client failure with an enclosing phase.
    pub(crate) fn within(self, phase: &str) -> Self {
        match self {
            SetupError::Client { context, source } => SetupError::Client {
                context: format!("{phase}: {context}"),
                source,
            },
            other => other,
        }
    }

    pub fn is_client(&self) -> bool {
        matches!(self, SetupError::Client { .. })
    }
}

/// Attach phase context to a gateway result.
pub(crate) trait Context<T> {
    fn context(self, context: impl Into<String>) -> Result<T, SetupError>;
}

impl<T> Context<T> for Result<T, ClientError> {
    fn context(self, context: impl Into<String>) -> Result<T, SetupError> {
        self.map_err(|source| SetupError::Client {
            context: context.into(),
            source,
        })
    }
}

/// A single failed upload.
#[derive(Debug)]
pub struct UploadFailure {
    pub location: String,
    pub error: SetupError,
}

/// Every failed upload of a pass, in declaration order.
#[derive(Debug)]
pub struct UploadErrors {
    pub failures: Vec<UploadFailure>,
}

impl UploadErrors {
    pub fn locations(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.location.as_str()).collect()
    }
}

impl fmt::Display for UploadErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} upload(s) failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  {}: {}", failure.location, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for UploadErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected() -> ClientError {
        ClientError::Rejected {
            endpoint: "/api/v1/pages".into(),
            detail: "nope".into(),
        }
    }

    #[test]
    fn within_prefixes_the_phase() {
        let err = Err::<(), _>(rejected())
            .context("creating page faq")
            .unwrap_err()
            .within("reconciling pages");
        assert!(err.is_client());
        assert!(err
            .to_string()
            .starts_with("reconciling pages: creating page faq: client error"));
    }

    #[test]
    fn upload_errors_list_every_location() {
        let err = UploadErrors {
            failures: vec![
                UploadFailure {
                    location: "a.pdf".into(),
                    error: Err::<(), _>(rejected()).context("x").unwrap_err(),
                },
                UploadFailure {
                    location: "b.pdf".into(),
                    error: Err::<(), _>(rejected()).context("y").unwrap_err(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.starts_with("2 upload(s) failed"));
        assert!(text.contains("a.pdf: x: client error"));
        assert!(text.contains("b.pdf: y: client error"));
        assert_eq!(err.locations(), vec!["a.pdf", "b.pdf"]);
    }
}

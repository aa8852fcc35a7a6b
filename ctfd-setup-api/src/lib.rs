//! Blocking gateway to the CTFd HTTP API.
//!
//! - [`session`] opens an anonymous session (cookie + CSRF nonce)
//! - [`client`] holds the [`CtfdApi`] trait and its HTTP [`Client`]
//! - [`types`] request and response payloads

pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::{Client, CtfdApi};
pub use error::ClientError;
pub use session::{extract_nonce, get_nonce_and_session};
pub use types::{ConfigsPatch, InputFile, Page, PageParams, RemoteFile, Session, SetupParams};

/// Build an HTTP client suited to CTFd: no automatic redirects, since the
/// prober and the form submissions read the redirect status themselves.
pub fn http_client() -> Result<reqwest::blocking::Client, ClientError> {
    reqwest::blocking::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(concat!("ctfd-setup/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ClientError::Transport {
            endpoint: "client builder".to_string(),
            source: e,
        })
}

//! Endpoint-scoped entry points used before a client exists.

use reqwest::blocking::Client as HttpClient;

use ctfd_setup_api::{get_nonce_and_session, http_client, Client, ClientError, CtfdApi, Session};

use crate::probe;

/// Opens sessions against one instance, probes it and builds clients for it.
pub trait Connector {
    type Api: CtfdApi;

    fn session(&self) -> Result<Session, ClientError>;
    fn is_bare(&self) -> Result<bool, ClientError>;
    fn connect(&self, session: Session, api_key: Option<&str>) -> Self::Api;
}

/// [`Connector`] over HTTP.
pub struct HttpConnector {
    url: String,
    http: HttpClient,
}

impl HttpConnector {
    pub fn new(url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            http: http_client()?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Connector for HttpConnector {
    type Api = Client;

    fn session(&self) -> Result<Session, ClientError> {
        get_nonce_and_session(&self.http, &self.url)
    }

    fn is_bare(&self) -> Result<bool, ClientError> {
        probe::is_bare(&self.http, &self.url)
    }

    fn connect(&self, session: Session, api_key: Option<&str>) -> Client {
        Client::new(
            self.http.clone(),
            &self.url,
            session,
            api_key.map(str::to_string),
        )
    }
}

//! Blocking CTFd client and the [`CtfdApi`] seam the reconciler drives.

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::header::{AUTHORIZATION, COOKIE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::session::{extract_nonce, session_cookie};
use crate::types::{ConfigsPatch, InputFile, Page, PageParams, RemoteFile, Session, SetupParams};

/// Longest response body kept in a [`ClientError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Operations the reconciler needs from a CTFd instance.
///
/// `login` and `setup` replace the session the client holds, every other
/// call only reads it.
pub trait CtfdApi {
    fn login(&mut self, name: &str, password: &str) -> Result<(), ClientError>;
    fn setup(&mut self, params: &SetupParams) -> Result<(), ClientError>;

    fn patch_configs(&self, patch: &ConfigsPatch) -> Result<(), ClientError>;
    /// Point the CTF logo at an uploaded file, or clear it with `None`.
    fn patch_logo(&self, location: Option<&str>) -> Result<(), ClientError>;
    fn patch_small_icon(&self, location: Option<&str>) -> Result<(), ClientError>;

    fn get_pages(&self) -> Result<Vec<Page>, ClientError>;
    fn get_page(&self, id: u64) -> Result<Page, ClientError>;
    fn post_page(&self, page: &PageParams) -> Result<Page, ClientError>;
    fn patch_page(&self, id: u64, page: &PageParams) -> Result<Page, ClientError>;
    fn delete_page(&self, id: u64) -> Result<(), ClientError>;

    /// Files stored at `location`.
    fn get_files(&self, location: &str) -> Result<Vec<RemoteFile>, ClientError>;
    fn post_files(
        &self,
        files: &[InputFile],
        location: Option<&str>,
    ) -> Result<Vec<RemoteFile>, ClientError>;
}

/// `{ success, data, errors, message }` wrapper around every API response.
#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl<T> Envelope<T> {
    fn reason(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match &self.errors {
            Some(errors) => errors.to_string(),
            None => "success: false".to_string(),
        }
    }
}

#[derive(Serialize)]
struct ConfigValue<'a> {
    value: Option<&'a str>,
}

/// HTTP implementation of [`CtfdApi`].
///
/// Authenticates with `Authorization: Token <key>` when an API key is set,
/// otherwise with the session cookie and its CSRF nonce.
pub struct Client {
    http: HttpClient,
    url: String,
    nonce: String,
    session: String,
    api_key: Option<String>,
}

impl Client {
    /// `http` must not follow redirects: login and setup detect success
    /// from the redirect status.
    pub fn new(http: HttpClient, url: &str, session: Session, api_key: Option<String>) -> Self {
        Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            nonce: session.nonce,
            session: session.session,
            api_key,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(AUTHORIZATION, format!("Token {key}")),
            None => request
                .header(COOKIE, format!("session={}", self.session))
                .header("CSRF-Token", &self.nonce),
        }
    }

    fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<String, ClientError> {
        let response = self
            .authorize(request)
            .send()
            .map_err(|e| ClientError::transport(endpoint, e))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ClientError::transport(endpoint, e))?;
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: truncate(body),
            });
        }
        Ok(body)
    }

    fn envelope<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> Result<Envelope<T>, ClientError> {
        let body = self.send(request, endpoint)?;
        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| ClientError::protocol(endpoint, e.to_string()))?;
        if !envelope.success {
            return Err(ClientError::rejected(endpoint, envelope.reason()));
        }
        Ok(envelope)
    }

    fn data<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> Result<T, ClientError> {
        self.envelope(request, endpoint)?
            .data
            .ok_or_else(|| ClientError::protocol(endpoint, "response has no data"))
    }

    fn acknowledge(&self, request: RequestBuilder, endpoint: &str) -> Result<(), ClientError> {
        self.envelope::<serde_json::Value>(request, endpoint)
            .map(|_| ())
    }

    /// Post an HTML form with the current session. CTFd answers a valid
    /// submission with a redirect and re-renders the form otherwise.
    fn submit_form(&mut self, path: &str, form: &[(&str, String)]) -> Result<(), ClientError> {
        let endpoint = format!("{}{path}", self.url);
        let response = self
            .http
            .post(&endpoint)
            .header(COOKIE, format!("session={}", self.session))
            .form(form)
            .send()
            .map_err(|e| ClientError::transport(&endpoint, e))?;
        if let Some(session) = session_cookie(response.headers()) {
            self.session = session;
        }

        let status = response.status();
        if status.is_redirection() {
            return self.refresh_nonce();
        }
        if status.is_success() {
            return Err(ClientError::rejected(
                &endpoint,
                "form was rendered again, the submitted values were refused",
            ));
        }
        Err(ClientError::Status {
            endpoint,
            status: status.as_u16(),
            body: truncate(response.text().unwrap_or_default()),
        })
    }

    /// The nonce is bound to the session, so a new session needs a new one.
    fn refresh_nonce(&mut self) -> Result<(), ClientError> {
        let endpoint = format!("{}/", self.url);
        let response = self
            .http
            .get(&endpoint)
            .header(COOKIE, format!("session={}", self.session))
            .send()
            .map_err(|e| ClientError::transport(&endpoint, e))?;
        if let Some(session) = session_cookie(response.headers()) {
            self.session = session;
        }
        let body = response
            .text()
            .map_err(|e| ClientError::transport(&endpoint, e))?;
        self.nonce = extract_nonce(&body)
            .ok_or_else(|| ClientError::protocol(&endpoint, "no CSRF nonce in page"))?;
        Ok(())
    }

    fn patch_config_value(&self, key: &str, location: Option<&str>) -> Result<(), ClientError> {
        let endpoint = self.endpoint(&format!("/configs/{key}"));
        let request = self
            .http
            .patch(&endpoint)
            .json(&ConfigValue { value: location });
        self.acknowledge(request, &endpoint)
    }
}

impl CtfdApi for Client {
    fn login(&mut self, name: &str, password: &str) -> Result<(), ClientError> {
        tracing::debug!(method = "login", "api call");
        let form = [
            ("name", name.to_string()),
            ("password", password.to_string()),
            ("_submit", "Submit".to_string()),
            ("nonce", self.nonce.clone()),
        ];
        self.submit_form("/login", &form)
    }

    fn setup(&mut self, params: &SetupParams) -> Result<(), ClientError> {
        tracing::debug!(method = "setup", "api call");
        let form = params.form(&self.nonce);
        self.submit_form("/setup", &form)
    }

    fn patch_configs(&self, patch: &ConfigsPatch) -> Result<(), ClientError> {
        tracing::debug!(method = "patch_configs", "api call");
        let endpoint = self.endpoint("/configs");
        self.acknowledge(self.http.patch(&endpoint).json(patch), &endpoint)
    }

    fn patch_logo(&self, location: Option<&str>) -> Result<(), ClientError> {
        tracing::debug!(method = "patch_logo", "api call");
        self.patch_config_value("ctf_logo", location)
    }

    fn patch_small_icon(&self, location: Option<&str>) -> Result<(), ClientError> {
        tracing::debug!(method = "patch_small_icon", "api call");
        self.patch_config_value("ctf_small_icon", location)
    }

    fn get_pages(&self) -> Result<Vec<Page>, ClientError> {
        tracing::debug!(method = "get_pages", "api call");
        let endpoint = self.endpoint("/pages");
        self.data(self.http.get(&endpoint), &endpoint)
    }

    fn get_page(&self, id: u64) -> Result<Page, ClientError> {
        tracing::debug!(method = "get_page", id, "api call");
        let endpoint = self.endpoint(&format!("/pages/{id}"));
        self.data(self.http.get(&endpoint), &endpoint)
    }

    fn post_page(&self, page: &PageParams) -> Result<Page, ClientError> {
        tracing::debug!(method = "post_page", route = %page.route, "api call");
        let endpoint = self.endpoint("/pages");
        self.data(self.http.post(&endpoint).json(page), &endpoint)
    }

    fn patch_page(&self, id: u64, page: &PageParams) -> Result<Page, ClientError> {
        tracing::debug!(method = "patch_page", id, route = %page.route, "api call");
        let endpoint = self.endpoint(&format!("/pages/{id}"));
        self.data(self.http.patch(&endpoint).json(page), &endpoint)
    }

    fn delete_page(&self, id: u64) -> Result<(), ClientError> {
        tracing::debug!(method = "delete_page", id, "api call");
        let endpoint = self.endpoint(&format!("/pages/{id}"));
        self.acknowledge(self.http.delete(&endpoint), &endpoint)
    }

    fn get_files(&self, location: &str) -> Result<Vec<RemoteFile>, ClientError> {
        tracing::debug!(method = "get_files", location, "api call");
        let endpoint = self.endpoint("/files");
        let request = self.http.get(&endpoint).query(&[("location", location)]);
        self.data(request, &endpoint)
    }

    fn post_files(
        &self,
        files: &[InputFile],
        location: Option<&str>,
    ) -> Result<Vec<RemoteFile>, ClientError> {
        tracing::debug!(method = "post_files", count = files.len(), "api call");
        let endpoint = self.endpoint("/files");
        let mut form = Form::new().text("type", "standard");
        if let Some(location) = location {
            form = form.text("location", location.to_string());
        }
        if self.api_key.is_none() {
            form = form.text("nonce", self.nonce.clone());
        }
        for file in files {
            let part = Part::bytes(file.content.clone()).file_name(file.name.clone());
            form = form.part("file", part);
        }
        self.data(self.http.post(&endpoint).multipart(form), &endpoint)
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("...");
    }
    body
}

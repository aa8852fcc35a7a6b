//! In-memory CTFd used by the reconciler tests.
//!
//! Every call is logged as `"<method> <detail>"` so tests can assert on the
//! exact write sequence.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use ctfd_setup_api::{
    ClientError, ConfigsPatch, CtfdApi, InputFile, Page, PageParams, RemoteFile, Session,
    SetupParams,
};

use crate::connector::Connector;
use crate::telemetry::{Fields, SpanGuard, Telemetry};
use crate::uploads::sha1_hex;

#[derive(Default)]
pub(crate) struct State {
    pub bare: bool,
    pub admin: Option<(String, String)>,
    pub pages: Vec<Page>,
    pub files: Vec<RemoteFile>,
    pub configs: Option<serde_json::Value>,
    pub logo: Option<String>,
    pub small_icon: Option<String>,
    pub calls: Vec<String>,
    pub api_keys: Vec<Option<String>>,
    pub next_id: u64,
    pub failing_locations: HashSet<String>,
    pub failing_pages: bool,
    pub omit_content: bool,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

fn refused(endpoint: &str) -> ClientError {
    ClientError::Status {
        endpoint: endpoint.to_string(),
        status: 500,
        body: "injected failure".to_string(),
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeCtfd {
    state: Rc<RefCell<State>>,
}

impl FakeCtfd {
    pub fn bare() -> Self {
        let fake = Self::default();
        fake.state.borrow_mut().bare = true;
        fake
    }

    pub fn provisioned() -> Self {
        Self::default()
    }

    pub fn api(&self) -> FakeApi {
        FakeApi {
            state: Rc::clone(&self.state),
        }
    }

    pub fn state(&self) -> std::cell::Ref<'_, State> {
        self.state.borrow()
    }

    pub fn seed_page(&self, page: Page) {
        let mut state = self.state.borrow_mut();
        state.next_id = state.next_id.max(page.id);
        state.pages.push(page);
    }

    pub fn routes(&self) -> Vec<String> {
        let mut routes: Vec<String> = self
            .state
            .borrow()
            .pages
            .iter()
            .map(|p| p.route.clone())
            .collect();
        routes.sort();
        routes
    }

    pub fn page(&self, route: &str) -> Option<Page> {
        self.state
            .borrow()
            .pages
            .iter()
            .find(|p| p.route == route)
            .cloned()
    }

    pub fn file_hash(&self, location: &str) -> Option<String> {
        self.state
            .borrow()
            .files
            .iter()
            .find(|f| f.location == location)
            .and_then(|f| f.sha1sum.clone())
    }

    pub fn count_calls(&self, method: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.split(' ').next() == Some(method))
            .count()
    }

    /// Calls that change remote state, in order.
    pub fn writes(&self) -> Vec<String> {
        const READS: [&str; 5] = ["session", "is_bare", "get_pages", "get_page", "get_files"];
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| !READS.iter().any(|r| c.split(' ').next() == Some(*r)))
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn fail_uploads_to(&self, location: &str) {
        self.state
            .borrow_mut()
            .failing_locations
            .insert(location.to_string());
    }

    pub fn fail_pages(&self) {
        self.state.borrow_mut().failing_pages = true;
    }

    pub fn omit_content_in_listing(&self) {
        self.state.borrow_mut().omit_content = true;
    }

    fn log(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl Connector for FakeCtfd {
    type Api = FakeApi;

    fn session(&self) -> Result<Session, ClientError> {
        self.log("session".to_string());
        Ok(Session {
            nonce: "n0nce".to_string(),
            session: "anonymous".to_string(),
        })
    }

    fn is_bare(&self) -> Result<bool, ClientError> {
        self.log("is_bare".to_string());
        Ok(self.state.borrow().bare)
    }

    fn connect(&self, _session: Session, api_key: Option<&str>) -> FakeApi {
        self.state
            .borrow_mut()
            .api_keys
            .push(api_key.map(str::to_string));
        self.api()
    }
}

pub(crate) struct FakeApi {
    state: Rc<RefCell<State>>,
}

impl FakeApi {
    fn log(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }

    fn store_page(page: &PageParams, id: u64) -> Page {
        Page {
            id,
            title: page.title.clone(),
            route: page.route.clone(),
            format: Some(page.format.clone()),
            content: Some(page.content.clone()),
            draft: Some(page.draft),
            hidden: Some(page.hidden),
            auth_required: Some(page.auth_required),
        }
    }
}

impl CtfdApi for FakeApi {
    fn login(&mut self, name: &str, password: &str) -> Result<(), ClientError> {
        self.log(format!("login {name}"));
        match &self.state.borrow().admin {
            Some((n, p)) if n != name || p != password => Err(ClientError::Rejected {
                endpoint: "/login".to_string(),
                detail: "invalid credentials".to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn setup(&mut self, params: &SetupParams) -> Result<(), ClientError> {
        self.log(format!("setup {}", params.ctf_name));
        let mut state = self.state.borrow_mut();
        if !state.bare {
            return Err(ClientError::Rejected {
                endpoint: "/setup".to_string(),
                detail: "already set up".to_string(),
            });
        }
        state.bare = false;
        state.admin = Some((params.name.clone(), params.password.clone()));
        Ok(())
    }

    fn patch_configs(&self, patch: &ConfigsPatch) -> Result<(), ClientError> {
        self.log("patch_configs".to_string());
        let value = serde_json::to_value(patch).map_err(|e| ClientError::Protocol {
            endpoint: "/api/v1/configs".to_string(),
            detail: e.to_string(),
        })?;
        self.state.borrow_mut().configs = Some(value);
        Ok(())
    }

    fn patch_logo(&self, location: Option<&str>) -> Result<(), ClientError> {
        self.log(format!("patch_logo {}", location.unwrap_or("-")));
        self.state.borrow_mut().logo = location.map(str::to_string);
        Ok(())
    }

    fn patch_small_icon(&self, location: Option<&str>) -> Result<(), ClientError> {
        self.log(format!("patch_small_icon {}", location.unwrap_or("-")));
        self.state.borrow_mut().small_icon = location.map(str::to_string);
        Ok(())
    }

    fn get_pages(&self) -> Result<Vec<Page>, ClientError> {
        self.log("get_pages".to_string());
        let state = self.state.borrow();
        let mut pages = state.pages.clone();
        if state.omit_content {
            for page in &mut pages {
                page.content = None;
            }
        }
        Ok(pages)
    }

    fn get_page(&self, id: u64) -> Result<Page, ClientError> {
        self.log(format!("get_page {id}"));
        self.state
            .borrow()
            .pages
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ClientError::Status {
                endpoint: format!("/api/v1/pages/{id}"),
                status: 404,
                body: String::new(),
            })
    }

    fn post_page(&self, page: &PageParams) -> Result<Page, ClientError> {
        self.log(format!("post_page {}", page.route));
        let mut state = self.state.borrow_mut();
        if state.failing_pages {
            return Err(refused("/api/v1/pages"));
        }
        let id = state.next_id();
        let stored = Self::store_page(page, id);
        state.pages.push(stored.clone());
        Ok(stored)
    }

    fn patch_page(&self, id: u64, page: &PageParams) -> Result<Page, ClientError> {
        self.log(format!("patch_page {}", page.route));
        let mut state = self.state.borrow_mut();
        if state.failing_pages {
            return Err(refused("/api/v1/pages"));
        }
        let stored = Self::store_page(page, id);
        match state.pages.iter_mut().find(|p| p.id == id) {
            Some(slot) => *slot = stored.clone(),
            None => return Err(refused("/api/v1/pages")),
        }
        Ok(stored)
    }

    fn delete_page(&self, id: u64) -> Result<(), ClientError> {
        let mut state = self.state.borrow_mut();
        let route = state
            .pages
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.route.clone())
            .unwrap_or_default();
        state.calls.push(format!("delete_page {route}"));
        if state.failing_pages {
            return Err(refused("/api/v1/pages"));
        }
        state.pages.retain(|p| p.id != id);
        Ok(())
    }

    fn get_files(&self, location: &str) -> Result<Vec<RemoteFile>, ClientError> {
        self.log(format!("get_files {location}"));
        Ok(self
            .state
            .borrow()
            .files
            .iter()
            .filter(|f| f.location == location)
            .cloned()
            .collect())
    }

    fn post_files(
        &self,
        files: &[InputFile],
        location: Option<&str>,
    ) -> Result<Vec<RemoteFile>, ClientError> {
        self.log(format!("post_files {}", location.unwrap_or("-")));
        let mut state = self.state.borrow_mut();
        if location.is_some_and(|l| state.failing_locations.contains(l)) {
            return Err(refused("/api/v1/files"));
        }

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            let sha1sum = sha1_hex(&file.content);
            let location = match location {
                Some(location) => location.to_string(),
                None => format!("{}/{}", &sha1sum[..8], file.name),
            };
            state.files.retain(|f| f.location != location);
            let remote = RemoteFile {
                id: state.next_id(),
                kind: Some("standard".to_string()),
                location,
                sha1sum: Some(sha1sum),
            };
            state.files.push(remote.clone());
            stored.push(remote);
        }
        Ok(stored)
    }
}

/// [`Telemetry`] that keeps every rendered event.
#[derive(Default)]
pub(crate) struct RecordingTelemetry {
    pub lines: RefCell<Vec<String>>,
}

impl RecordingTelemetry {
    fn record(&self, level: &str, message: &str, fields: Fields<'_>) {
        let mut line = format!("{level} {message}");
        for (key, value) in fields {
            line.push_str(&format!(" {key}={value}"));
        }
        self.lines.borrow_mut().push(line);
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }
}

impl Telemetry for RecordingTelemetry {
    fn info(&self, message: &str, fields: Fields<'_>) {
        self.record("INFO", message, fields);
    }

    fn debug(&self, message: &str, fields: Fields<'_>) {
        self.record("DEBUG", message, fields);
    }

    fn error(&self, message: &str, fields: Fields<'_>) {
        self.record("ERROR", message, fields);
    }

    fn span(&self, phase: &'static str) -> SpanGuard {
        self.record("SPAN", phase, &[]);
        SpanGuard::none()
    }
}

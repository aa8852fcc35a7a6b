//! One reconciliation pass.
//!
//! ## Sequence
//!
//! 1. Validate the configuration (no network call on failure).
//! 2. Open an anonymous session and probe whether the instance is bare.
//! 3. Bare: run the setup wizard. Provisioned without API key: log in as the
//!    declared admin. With an API key: use it as is.
//! 4. Update, whichever branch ran: branding, settings, pages, uploads.
//!
//! Session and probe failures abort the pass. Upload failures are collected
//! and returned once every upload was attempted. Nothing is rolled back;
//! every phase converges, so a failed pass can simply be run again.

use ctfd_setup_api::{ClientError, CtfdApi};
use ctfd_setup_core::{Config, File};

use crate::connector::Connector;
use crate::error::{Context, SetupError};
use crate::pages::{self, PageAction};
use crate::settings;
use crate::telemetry::{Telemetry, TracingTelemetry};
use crate::uploads::{self, input_file, UploadOutcome};

/// What a pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    /// The instance was bare and went through the setup wizard.
    pub bootstrapped: bool,
    pub pages: Vec<PageAction>,
    pub uploads: Vec<UploadOutcome>,
}

impl SetupReport {
    /// Number of remote writes on pages and uploads.
    pub fn changes(&self) -> usize {
        let uploaded = self
            .uploads
            .iter()
            .filter(|u| matches!(u, UploadOutcome::Uploaded { .. }))
            .count();
        self.pages.len() + uploaded
    }
}

/// Branding slot: which pointer to patch and how to describe it.
#[derive(Clone, Copy)]
enum Brand {
    Logo,
    SmallIcon,
}

impl Brand {
    fn push_context(self) -> &'static str {
        match self {
            Brand::Logo => "pushing theme logo",
            Brand::SmallIcon => "pushing theme small icon",
        }
    }

    fn patch_context(self) -> &'static str {
        match self {
            Brand::Logo => "patching CTF logo",
            Brand::SmallIcon => "patching CTF small icon",
        }
    }

    fn fallback_name(self) -> &'static str {
        match self {
            Brand::Logo => "logo",
            Brand::SmallIcon => "small_icon",
        }
    }

    fn patch<A: CtfdApi>(self, api: &A, location: Option<&str>) -> Result<(), ClientError> {
        match self {
            Brand::Logo => api.patch_logo(location),
            Brand::SmallIcon => api.patch_small_icon(location),
        }
    }
}

/// Drives a [`Connector`] towards a [`Config`].
pub struct Reconciler<C, T = TracingTelemetry> {
    connector: C,
    telemetry: T,
}

impl<C: Connector> Reconciler<C> {
    pub fn with_tracing(connector: C) -> Self {
        Self::new(connector, TracingTelemetry)
    }
}

impl<C: Connector, T: Telemetry> Reconciler<C, T> {
    pub fn new(connector: C, telemetry: T) -> Self {
        Self {
            connector,
            telemetry,
        }
    }

    /// Bootstrap or authenticate, then converge the instance onto `config`.
    pub fn setup(&self, api_key: Option<&str>, config: &Config) -> Result<SetupReport, SetupError> {
        config.validate()?;
        let _span = self.telemetry.span("setup");

        let session = self
            .connector
            .session()
            .context("getting CTFd nonce and session")?;
        let bare = self.connector.is_bare().context("probing setup state")?;
        let mut api = self.connector.connect(session, api_key);

        if bare {
            self.telemetry.info(
                "bootstrapping bare instance",
                &[
                    ("name", config.appearance.name.clone()),
                    ("mode", config.mode.to_string()),
                ],
            );
            api.setup(&settings::setup_params(config))
                .context("bootstrapping bare instance")?;
        } else if api_key.is_none() {
            self.telemetry
                .info("logging in", &[("admin", config.admin.name.clone())]);
            api.login(&config.admin.name, config.admin.password.expose())
                .context("logging in as admin")?;
        } else {
            self.telemetry.debug("authenticating with API key", &[]);
        }

        let mut report = self.update(&api, config)?;
        report.bootstrapped = bare;
        Ok(report)
    }

    fn update(&self, api: &C::Api, config: &Config) -> Result<SetupReport, SetupError> {
        {
            let _span = self.telemetry.span("branding");
            self.push_brand(api, Brand::Logo, config.theme.logo.as_ref())?;
            self.push_brand(api, Brand::SmallIcon, config.theme.small_icon.as_ref())?;
        }

        {
            let _span = self.telemetry.span("settings");
            api.patch_configs(&settings::configs_patch(config))
                .context("patching CTF configs")?;
            self.telemetry
                .info("patched CTF configs", &[("theme", config.theme.name.clone())]);
        }

        let pages = if config.pages.additional.is_empty() {
            self.telemetry.debug("no pages declared, leaving remote pages", &[]);
            Vec::new()
        } else {
            let _span = self.telemetry.span("pages");
            pages::reconcile(api, &config.pages.additional, &self.telemetry as &dyn Telemetry)
                .map_err(|e| e.within("reconciling pages"))?
        };

        let uploads = {
            let _span = self.telemetry.span("uploads");
            uploads::sync_all(api, &config.uploads, &self.telemetry as &dyn Telemetry)?
        };

        Ok(SetupReport {
            bootstrapped: false,
            pages,
            uploads,
        })
    }

    /// Upload a non-empty asset and point the slot at it, or clear the slot.
    fn push_brand(&self, api: &C::Api, brand: Brand, file: Option<&File>) -> Result<(), SetupError> {
        let location = match file.filter(|f| !f.is_empty()) {
            Some(file) => {
                let stored = api
                    .post_files(&[input_file(file, brand.fallback_name())], None)
                    .context(brand.push_context())?;
                let first = stored.into_iter().next().ok_or_else(|| SetupError::Client {
                    context: brand.push_context().to_string(),
                    source: ClientError::Protocol {
                        endpoint: "/api/v1/files".to_string(),
                        detail: "upload returned no file".to_string(),
                    },
                })?;
                Some(first.location)
            }
            None => None,
        };

        brand
            .patch(api, location.as_deref())
            .context(brand.patch_context())?;
        self.telemetry.debug(
            brand.patch_context(),
            &[("location", location.unwrap_or_else(|| "-".to_string()))],
        );
        Ok(())
    }
}

//! ctfd-setup-sync — probe a CTFd instance and converge it onto a configuration.
//!
//! - [`probe`] — bare or provisioned
//! - [`connector`] — session, probe and client construction per instance
//! - [`reconcile`] — the full pass, [`Reconciler::setup`]
//! - [`settings`] — configuration to setup/patch payloads
//! - [`pages`] — route-keyed page reconciliation
//! - [`uploads`] — SHA-1 gated uploads
//! - [`telemetry`] — injected observability handle

pub mod connector;
pub mod error;
pub mod pages;
pub mod probe;
pub mod reconcile;
pub mod settings;
pub mod telemetry;
pub mod uploads;

#[cfg(test)]
pub(crate) mod fake;

pub use connector::{Connector, HttpConnector};
pub use error::{SetupError, UploadErrors, UploadFailure};
pub use pages::PageAction;
pub use reconcile::{Reconciler, SetupReport};
pub use telemetry::{SpanGuard, Telemetry, TracingTelemetry};
pub use uploads::UploadOutcome;

//! ctfd-setup core library — configuration model, source resolution, validation.
//!
//! - [`types`] — the declarative configuration document
//! - [`source`] — [`Secret`] and [`File`], resolved from literals, env or files
//! - [`config`] — load / resolve / validate
//! - [`error`] — [`ConfigError`], [`ValidationError`]

pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use error::{ConfigError, Problem, ValidationError};
pub use source::{File, Secret, Source};
pub use types::{
    Accounts, Admin, Appearance, Challenges, Config, Email, EmailContent, ExternalReference,
    Legal, MajorLeagueCyber, Mode, Page, PageFormat, Pages, Security, Settings, Social, Theme,
    Time, Upload,
};

//! Error types for ctfd-setup-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, with the path that was being read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with the file path and serde_yaml's line context.
    #[error("failed to parse configuration at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// YAML parse error for an in-memory document (no path to report).
    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}

/// One reason a configuration is not usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// A mandatory field is empty after resolution.
    Missing(&'static str),
    /// A field that must be set on every entry of a list is empty.
    Empty(String),
    /// Two declared pages share a route.
    DuplicateRoute(String),
    /// Two declared uploads share a remote location.
    DuplicateLocation(String),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing(field) => write!(f, "{field} is required"),
            Problem::Empty(field) => write!(f, "{field} must not be empty"),
            Problem::DuplicateRoute(route) => write!(f, "page route {route} is declared twice"),
            Problem::DuplicateLocation(location) => {
                write!(f, "upload location {location} is declared twice")
            }
        }
    }
}

/// Aggregated validation failure: every problem found, never just the first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub problems: Vec<Problem>,
}

impl ValidationError {
    /// Names of the mandatory fields reported as missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.problems
            .iter()
            .filter_map(|p| match p {
                Problem::Missing(field) => Some(*field),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: ")?;
        for (i, problem) in self.problems.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{problem}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_problem() {
        let err = ValidationError {
            problems: vec![
                Problem::Missing("admin.name"),
                Problem::Missing("admin.email"),
                Problem::DuplicateRoute("faq".into()),
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("invalid configuration: "));
        assert!(msg.contains("admin.name is required"));
        assert!(msg.contains("admin.email is required"));
        assert!(msg.contains("page route faq is declared twice"));
        assert_eq!(err.missing_fields(), vec!["admin.name", "admin.email"]);
    }

    #[test]
    fn io_error_names_the_path() {
        let err = io_err(
            "/nowhere/logo.png",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/nowhere/logo.png"));
    }
}

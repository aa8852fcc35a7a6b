//! Indirect configuration values: secrets and file contents.
//!
//! Both accept the same three YAML shapes:
//!
//! ```yaml
//! password: hunter2                  # literal
//! password: { from_env: ADMIN_PASS } # environment variable
//! password: { from_file: pass.txt }  # file, relative to the base directory
//! ```
//!
//! Values are resolved once, at load time, by [`Secret::resolve`] and
//! [`File::resolve`]. Nothing downstream ever looks at a [`Source`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::{io_err, ConfigError};

const REDACTED: &str = "[REDACTED]";

/// Where a value comes from.
///
/// Any YAML scalar is a literal, so `password: 12345678` and `name: true`
/// read as the text `12345678` and `true`.
#[derive(Clone, PartialEq, Eq)]
pub enum Source {
    Literal(String),
    FromEnv { from_env: String },
    FromFile { from_file: PathBuf },
}

/// Mapping form of a [`Source`]. Exactly one key must be set.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Indirect {
    from_env: Option<String>,
    from_file: Option<PathBuf>,
}

struct SourceVisitor;

impl<'de> Visitor<'de> for SourceVisitor {
    type Value = Source;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar, { from_env: VAR } or { from_file: PATH }")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Source, E> {
        Ok(Source::Literal(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Source, E> {
        Ok(Source::Literal(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Source, E> {
        Ok(Source::Literal(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Source, E> {
        Ok(Source::Literal(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Source, E> {
        Ok(Source::Literal(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Source, E> {
        Ok(Source::Literal(v.to_string()))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Source, A::Error> {
        let indirect = Indirect::deserialize(de::value::MapAccessDeserializer::new(map))?;
        match (indirect.from_env, indirect.from_file) {
            (Some(from_env), None) => Ok(Source::FromEnv { from_env }),
            (None, Some(from_file)) => Ok(Source::FromFile { from_file }),
            (Some(_), Some(_)) => Err(de::Error::custom(
                "from_env and from_file are mutually exclusive",
            )),
            (None, None) => Err(de::Error::custom("expected from_env or from_file")),
        }
    }
}

impl<'de> Deserialize<'de> for Source {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SourceVisitor)
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Literal(_) => f.write_str("Literal(..)"),
            Source::FromEnv { from_env } => write!(f, "FromEnv({from_env})"),
            Source::FromFile { from_file } => write!(f, "FromFile({})", from_file.display()),
        }
    }
}

fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

// ---------------------------------------------------------------------------
// Secret
// ---------------------------------------------------------------------------

/// A credential. Never rendered in cleartext by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Source")]
pub struct Secret {
    source: Option<Source>,
    value: String,
}

impl Secret {
    /// An already-resolved secret.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            source: None,
            value: value.into(),
        }
    }

    /// The cleartext value. Callers must not log it.
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Resolve an environment or file source into the cleartext value.
    ///
    /// An unset variable resolves to empty. File contents lose their trailing
    /// line break.
    pub fn resolve(&mut self, base_dir: &Path) -> Result<(), ConfigError> {
        let Some(source) = self.source.take() else {
            return Ok(());
        };
        self.value = match source {
            Source::Literal(value) => value,
            Source::FromEnv { from_env } => std::env::var(&from_env).unwrap_or_default(),
            Source::FromFile { from_file } => {
                let path = resolve_path(base_dir, &from_file);
                let raw = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
                raw.trim_end_matches(['\r', '\n']).to_string()
            }
        };
        Ok(())
    }
}

impl Default for Secret {
    fn default() -> Self {
        Self::new("")
    }
}

impl From<Source> for Secret {
    fn from(source: Source) -> Self {
        match source {
            Source::Literal(value) => Self::new(value),
            other => Self {
                source: Some(other),
                value: String::new(),
            },
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// A named byte blob.
///
/// Optional file fields are `Option<File>`: `None` means "not declared",
/// `Some` with no bytes means "declared and empty".
#[derive(Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Source")]
pub struct File {
    source: Option<Source>,
    name: String,
    content: Vec<u8>,
}

impl File {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            source: None,
            name: name.into(),
            content: content.into(),
        }
    }

    /// File name used when uploading. Empty for inline content.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Content as text, for fields the remote API stores as strings.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// Read the file (relative to `base_dir`) or environment variable.
    pub fn resolve(&mut self, base_dir: &Path) -> Result<(), ConfigError> {
        let Some(source) = self.source.take() else {
            return Ok(());
        };
        match source {
            Source::Literal(value) => self.content = value.into_bytes(),
            Source::FromEnv { from_env } => {
                self.content = std::env::var(&from_env).unwrap_or_default().into_bytes();
            }
            Source::FromFile { from_file } => {
                let path = resolve_path(base_dir, &from_file);
                self.content = std::fs::read(&path).map_err(|e| io_err(&path, e))?;
                self.name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
            }
        }
        Ok(())
    }
}

impl From<Source> for File {
    fn from(source: Source) -> Self {
        match source {
            Source::Literal(value) => Self::new(String::new(), value),
            other => Self {
                source: Some(other),
                ..Self::default()
            },
        }
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("name", &self.name)
            .field("len", &self.content.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn secret_never_renders_cleartext() {
        let secret = Secret::new("hunter2");
        assert_eq!(secret.to_string(), "[REDACTED]");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn literal_secret_is_resolved_on_parse() {
        let secret: Secret = serde_yaml::from_str("hunter2").unwrap();
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn secret_from_env() {
        std::env::set_var("CTFD_SETUP_TEST_SECRET_FROM_ENV", "s3cr3t");
        let mut secret: Secret =
            serde_yaml::from_str("from_env: CTFD_SETUP_TEST_SECRET_FROM_ENV").unwrap();
        assert!(secret.is_empty(), "unresolved secret has no value yet");
        secret.resolve(Path::new(".")).unwrap();
        assert_eq!(secret.expose(), "s3cr3t");
    }

    #[test]
    fn secret_from_unset_env_is_empty() {
        let mut secret: Secret =
            serde_yaml::from_str("from_env: CTFD_SETUP_TEST_SURELY_UNSET_VARIABLE").unwrap();
        secret.resolve(Path::new(".")).unwrap();
        assert!(secret.is_empty());
    }

    #[test]
    fn secret_from_file_drops_trailing_newline() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("pass.txt"), "pa55\n").unwrap();
        let mut secret: Secret = serde_yaml::from_str("from_file: pass.txt").unwrap();
        secret.resolve(dir.path()).unwrap();
        assert_eq!(secret.expose(), "pa55");
    }

    #[test]
    fn file_from_relative_path_uses_base_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
        let mut file: File = serde_yaml::from_str("from_file: assets/logo.png").unwrap();
        file.resolve(dir.path()).unwrap();
        assert_eq!(file.name(), "logo.png");
        assert_eq!(file.content(), &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn file_missing_on_disk_reports_path() {
        let dir = TempDir::new().unwrap();
        let mut file: File = serde_yaml::from_str("from_file: nope.css").unwrap();
        let err = file.resolve(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("nope.css"));
    }

    #[test]
    fn inline_file_keeps_content() {
        let file: File = serde_yaml::from_str("'User-agent: *'").unwrap();
        assert_eq!(file.text(), "User-agent: *");
        assert_eq!(file.name(), "");
    }

    #[test]
    fn both_indirections_at_once_are_rejected() {
        let err = serde_yaml::from_str::<Secret>("{ from_env: A, from_file: b.txt }").unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn present_but_empty_file_differs_from_absent() {
        let present: Option<File> = serde_yaml::from_str("''").unwrap();
        let absent: Option<File> = serde_yaml::from_str("~").unwrap();
        assert!(present.as_ref().is_some_and(File::is_empty));
        assert!(absent.is_none());
    }
}

//! Content-addressed upload gate.
//!
//! ## Per upload
//!
//! 1. SHA-1 the declared bytes (CTFd records `sha1sum` for stored files).
//! 2. List remote files at the target location.
//! 3. Skip when the first one carries the same hash.
//! 4. Otherwise upload to the location, replacing what is there.
//!
//! Uploads never delete: a location dropped from the configuration keeps its
//! remote file.

use sha1::{Digest, Sha1};

use ctfd_setup_api::{CtfdApi, InputFile};
use ctfd_setup_core::{File, Upload};

use crate::error::{Context, SetupError, UploadErrors, UploadFailure};
use crate::telemetry::Telemetry;

/// Outcome of a single upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Content differed (or nothing was stored) and was uploaded.
    Uploaded { location: String },
    /// Remote hash matched, no write.
    Unchanged { location: String },
}

impl UploadOutcome {
    pub fn location(&self) -> &str {
        match self {
            UploadOutcome::Uploaded { location } | UploadOutcome::Unchanged { location } => {
                location
            }
        }
    }
}

/// Lowercase hex SHA-1 of `content`.
pub fn sha1_hex(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Upload payload for `file`, named after `fallback` when the file has no
/// name of its own.
pub(crate) fn input_file(file: &File, fallback: &str) -> InputFile {
    let name = if file.name().is_empty() {
        fallback.rsplit('/').next().unwrap_or(fallback)
    } else {
        file.name()
    };
    InputFile {
        name: name.to_string(),
        content: file.content().to_vec(),
    }
}

/// Bring one location in line with the declared content.
pub fn sync_upload<A: CtfdApi>(
    api: &A,
    upload: &Upload,
    telemetry: &dyn Telemetry,
) -> Result<UploadOutcome, SetupError> {
    let location = upload.location.as_str();
    let digest = sha1_hex(upload.file.content());

    let remote = api
        .get_files(location)
        .context(format!("getting files at {location}"))?;
    let stored = remote.first().and_then(|f| f.sha1sum.as_deref());
    if stored == Some(digest.as_str()) {
        telemetry.debug("upload unchanged", &[("location", location.to_string())]);
        return Ok(UploadOutcome::Unchanged {
            location: location.to_string(),
        });
    }

    api.post_files(&[input_file(&upload.file, location)], Some(location))
        .context(format!("uploading file to {location}"))?;
    telemetry.info(
        "uploaded file",
        &[("location", location.to_string()), ("sha1", digest)],
    );
    Ok(UploadOutcome::Uploaded {
        location: location.to_string(),
    })
}

/// Attempt every upload, then report all failures together.
pub fn sync_all<A: CtfdApi>(
    api: &A,
    uploads: &[Upload],
    telemetry: &dyn Telemetry,
) -> Result<Vec<UploadOutcome>, UploadErrors> {
    let mut outcomes = Vec::with_capacity(uploads.len());
    let mut failures = Vec::new();

    for upload in uploads {
        match sync_upload(api, upload, telemetry) {
            Ok(outcome) => outcomes.push(outcome),
            Err(error) => {
                telemetry.error(
                    "upload failed",
                    &[
                        ("location", upload.location.clone()),
                        ("error", error.to_string()),
                    ],
                );
                failures.push(UploadFailure {
                    location: upload.location.clone(),
                    error,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(outcomes)
    } else {
        Err(UploadErrors { failures })
    }
}

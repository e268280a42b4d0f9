//! # Artifact Store
//!
//! Tarball bytes on disk. Publishing writes the decoded attachment to
//! `<root>/<attachment-name>`; downloads find the same file from the part of
//! the tarball URL after the `/-/` separator the npm client inserts between
//! package name and filename:
//!
//! ```text
//! publish attachment   @scope/pkg-1.0.0.tgz
//! stored at            <root>/@scope/pkg-1.0.0.tgz
//! downloaded from      /@scope/pkg/-/@scope/pkg-1.0.0.tgz
//! ```

use base64::{engine::general_purpose, Engine as _};
use percent_encoding::percent_decode_str;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::layout::StorageLayout;
use crate::storage;
use crate::validation;

pub const TARBALL_SUFFIX: &str = ".tgz";
pub const TARBALL_SEPARATOR: &str = "/-/";

/// Extracts the stored tarball name from a request path.
///
/// Returns `None` unless the path ends in `.tgz` and contains the `/-/`
/// separator. Everything after the first separator is percent-decoded and
/// returned.
///
/// ```rust
/// use npm_lite_server::artifact::tarball_relative_path;
///
/// assert_eq!(
///     tarball_relative_path("/@scope/pkg/-/@scope/pkg-1.0.0.tgz").as_deref(),
///     Some("@scope/pkg-1.0.0.tgz")
/// );
/// assert_eq!(tarball_relative_path("/pkg/-/pkg-1.0.0.tar"), None);
/// ```
pub fn tarball_relative_path(uri_path: &str) -> Option<String> {
    if !uri_path.ends_with(TARBALL_SUFFIX) {
        return None;
    }

    let (_, relative) = uri_path.split_once(TARBALL_SEPARATOR)?;
    let decoded = percent_decode_str(relative).decode_utf8().ok()?;
    Some(decoded.into_owned())
}

/// Reads and writes tarballs under a storage root.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    layout: StorageLayout,
}

impl ArtifactStore {
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// Decodes a base64 attachment and writes it to `<root>/<attachment_name>`,
    /// creating the package directory on demand and overwriting any file
    /// already there. Returns the number of bytes written.
    ///
    /// Only `.tgz` names are accepted. Oversized data is an
    /// [`AppError::UploadError`].
    pub async fn ingest(
        &self,
        attachment_name: &str,
        data_b64: &str,
        max_size: u64,
    ) -> AppResult<u64> {
        if !attachment_name.ends_with(TARBALL_SUFFIX) {
            warn!(attachment = %attachment_name, "Attachment is not a tarball");
            return Err(AppError::BadRequest(format!(
                "Attachment '{}' must be a {} file",
                attachment_name, TARBALL_SUFFIX
            )));
        }

        let path = self.layout.artifact_path(attachment_name).map_err(|e| {
            warn!(attachment = %attachment_name, error = %e, "Rejected attachment name");
            e
        })?;

        validation::validate_base64_size(
            data_b64,
            Some(validation::max_base64_encoded_size(max_size)),
            Some(max_size),
        )
        .map_err(|e| {
            warn!(attachment = %attachment_name, error = %e, "Base64 size validation failed");
            AppError::UploadError(format!("Attachment '{}': {}", attachment_name, e))
        })?;
        validation::validate_base64_characters(data_b64)?;

        let tarball = general_purpose::STANDARD.decode(data_b64).map_err(|e| {
            warn!(attachment = %attachment_name, error = %e, "Failed to decode base64 data");
            e
        })?;
        validation::validate_file_size(tarball.len() as u64, Some(max_size))
            .map_err(|e| AppError::UploadError(format!("Attachment '{}': {}", attachment_name, e)))?;

        storage::save_file(&path, &tarball).await?;
        info!(attachment = %attachment_name, size = tarball.len(), "Tarball stored");
        Ok(tarball.len() as u64)
    }

    /// Loads a stored tarball for download.
    ///
    /// `None` when the name is unsafe or no regular file exists there; the
    /// caller then lets the request continue down the normal route table.
    pub async fn read(&self, relative: &str) -> Option<(Vec<u8>, PathBuf)> {
        let path = match self.layout.artifact_path(relative) {
            Ok(path) => path,
            Err(e) => {
                debug!(tarball = %relative, error = %e, "Ignoring unsafe tarball path");
                return None;
            }
        };

        match storage::read_file(&path).await {
            Ok(tarball) => Some((tarball, path)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Tarball not available");
                None
            }
        }
    }
}

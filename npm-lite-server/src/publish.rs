//! # Publish Flow
//!
//! An npm publish is a single JSON document: the package manifest plus an
//! `_attachments` object mapping tarball names to base64 data.
//!
//! ```json
//! {
//!   "name": "@scope/pkg",
//!   "dist-tags": { "latest": "1.0.0" },
//!   "versions": { "1.0.0": { "name": "@scope/pkg", "version": "1.0.0" } },
//!   "_attachments": {
//!     "@scope/pkg-1.0.0.tgz": { "content_type": "application/octet-stream", "data": "H4sI..." }
//!   }
//! }
//! ```
//!
//! Only the first attachment (document order) is stored; the rest are
//! ignored. `_attachments` is removed before the manifest is merged and saved.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::layout::PackageId;
use crate::state::AppState;

pub const ATTACHMENTS_FIELD: &str = "_attachments";
const NAME_FIELD: &str = "name";

/// The tarball carried by a publish payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub data: String,
}

/// A publish payload split into the manifest to merge and the tarball to store.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub package: PackageId,
    pub manifest: Map<String, Value>,
    pub attachment: Attachment,
}

impl PublishRequest {
    /// Splits a publish payload.
    ///
    /// The package is named by the manifest's `name` field, falling back to
    /// `route_package` (the name from the request path) when `name` is missing
    /// or not a non-empty string.
    pub fn from_payload(route_package: &str, payload: Value) -> AppResult<Self> {
        let mut manifest = match payload {
            Value::Object(manifest) => manifest,
            _ => {
                return Err(AppError::BadRequest(
                    "Publish payload must be a JSON object".to_string(),
                ))
            }
        };

        let attachments = match manifest.remove(ATTACHMENTS_FIELD) {
            Some(Value::Object(attachments)) => attachments,
            Some(_) => {
                return Err(AppError::BadRequest(format!(
                    "Package '{}': '{}' field is not an object",
                    route_package, ATTACHMENTS_FIELD
                )))
            }
            None => {
                return Err(AppError::BadRequest(format!(
                    "Package '{}': '{}' field is missing",
                    route_package, ATTACHMENTS_FIELD
                )))
            }
        };

        let (filename, attachment) = attachments.into_iter().next().ok_or_else(|| {
            AppError::BadRequest(format!(
                "Package '{}': publish payload carries no attachment",
                route_package
            ))
        })?;

        let data = match attachment.get("data") {
            Some(Value::String(data)) => data.clone(),
            _ => {
                return Err(AppError::BadRequest(format!(
                    "Attachment '{}': 'data' field is not a string",
                    filename
                )))
            }
        };

        let declared_name = manifest
            .get(NAME_FIELD)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty());
        let package = PackageId::parse(declared_name.unwrap_or(route_package))?;

        Ok(Self {
            package,
            manifest,
            attachment: Attachment { filename, data },
        })
    }
}

/// Stores the tarball, then merges the manifest into what is already stored.
pub async fn publish(state: &AppState, route_package: &str, payload: Value) -> AppResult<PackageId> {
    let request = PublishRequest::from_payload(route_package, payload).map_err(|e| {
        warn!(package = %route_package, error = %e, "Rejected publish payload");
        e
    })?;

    debug!(
        package = %request.package,
        attachment = %request.attachment.filename,
        "Processing publish"
    );

    state
        .artifacts
        .ingest(
            &request.attachment.filename,
            &request.attachment.data,
            state.config.max_upload_size_bytes(),
        )
        .await?;

    state
        .manifests
        .merge_and_persist(&request.package, request.manifest)
        .await?;

    info!(
        package = %request.package,
        attachment = %request.attachment.filename,
        "Package published"
    );
    Ok(request.package)
}

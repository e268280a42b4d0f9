//! # Manifest Store
//!
//! Per-package JSON manifests: lookup and the merge performed on publish.
//!
//! A stored manifest's `versions` object is the union of every version ever
//! published for the package. Publishing overlays the incoming `versions` on
//! the stored ones key by key, so a republished version takes the incoming
//! descriptor and nothing previously recorded is dropped. All other top-level
//! fields are taken from the incoming manifest as given.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::layout::{PackageId, StorageLayout};
use crate::locks::PackageLocks;
use crate::storage::{self, ManifestRead};

pub const VERSIONS_FIELD: &str = "versions";

/// Union of two `versions` values; `incoming` wins on key collisions.
///
/// Anything that is not a JSON object (including a missing field) contributes
/// no versions.
pub fn merge_versions(prior: Option<&Value>, incoming: Option<&Value>) -> Map<String, Value> {
    let mut merged = prior
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    if let Some(incoming) = incoming.and_then(Value::as_object) {
        for (version, descriptor) in incoming {
            merged.insert(version.clone(), descriptor.clone());
        }
    }

    merged
}

/// Builds the manifest to persist from the incoming document and whatever is
/// stored for the package.
pub fn merge_manifest(
    mut incoming: Map<String, Value>,
    prior: Option<&Map<String, Value>>,
) -> Map<String, Value> {
    let versions = merge_versions(
        prior.and_then(|p| p.get(VERSIONS_FIELD)),
        incoming.get(VERSIONS_FIELD),
    );
    incoming.insert(VERSIONS_FIELD.to_string(), Value::Object(versions));
    incoming
}

/// Reads, merges and persists manifests under a storage root.
#[derive(Debug)]
pub struct ManifestStore {
    layout: StorageLayout,
    locks: PackageLocks,
}

impl ManifestStore {
    pub fn new(layout: StorageLayout) -> Self {
        Self {
            layout,
            locks: PackageLocks::new(),
        }
    }

    pub fn locks(&self) -> &PackageLocks {
        &self.locks
    }

    /// Merges `incoming` into the stored manifest for `package` and writes the
    /// result back, returning what was written.
    ///
    /// A missing or unreadable stored manifest counts as "no prior versions".
    /// The read-merge-write runs under the package's lock, so concurrent
    /// publishes of one package never lose each other's versions.
    pub async fn merge_and_persist(
        &self,
        package: &PackageId,
        incoming: Map<String, Value>,
    ) -> AppResult<Map<String, Value>> {
        let path = self.layout.manifest_path(package);
        let _guard = self.locks.acquire(&package.to_string()).await;

        let prior = match storage::read_manifest(&path).await {
            ManifestRead::Found(prior) => Some(prior),
            ManifestRead::Absent => {
                debug!(package = %package, "No stored manifest, starting fresh");
                None
            }
            ManifestRead::Malformed(reason) => {
                warn!(package = %package, reason = %reason,
                      "Stored manifest unreadable, prior versions discarded");
                None
            }
        };

        let merged = merge_manifest(incoming, prior.as_ref());
        storage::write_manifest(&path, &merged).await?;

        let version_count = merged
            .get(VERSIONS_FIELD)
            .and_then(|versions| versions.as_object())
            .map_or(0, |versions| versions.len());
        info!(package = %package, versions = version_count, "Manifest updated");
        Ok(merged)
    }

    /// Loads the stored manifest for `package`.
    ///
    /// Missing and malformed manifests both surface as [`AppError::NotFound`].
    pub async fn lookup(&self, package: &PackageId) -> AppResult<Map<String, Value>> {
        let path = self.layout.manifest_path(package);

        match storage::read_manifest(&path).await {
            ManifestRead::Found(manifest) => {
                debug!(package = %package, "Serving stored manifest");
                Ok(manifest)
            }
            ManifestRead::Absent => Err(AppError::NotFound(format!(
                "No manifest for package '{}'",
                package
            ))),
            ManifestRead::Malformed(reason) => {
                warn!(package = %package, reason = %reason, "Refusing to serve malformed manifest");
                Err(AppError::NotFound(format!(
                    "Manifest for package '{}' is unreadable",
                    package
                )))
            }
        }
    }
}

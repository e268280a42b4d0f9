//! # Application State Management
//!
//! [`AppState`] is built once at startup and shared by every request handler
//! behind an `Arc`.

use crate::artifact::ArtifactStore;
use crate::config::Config;
use crate::layout::StorageLayout;
use crate::manifest::ManifestStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared registry state.
///
/// The filesystem under `layout.root()` is the only persistent state; the
/// manifest store additionally owns the per-package locks that serialize
/// publishes.
#[derive(Debug)]
pub struct AppState {
    /// Path resolution for the storage root
    pub layout: StorageLayout,
    /// Package manifests
    pub manifests: ManifestStore,
    /// Package tarballs
    pub artifacts: ArtifactStore,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(root: impl Into<PathBuf>, config: Arc<Config>) -> Self {
        let layout = StorageLayout::new(root);
        Self {
            manifests: ManifestStore::new(layout.clone()),
            artifacts: ArtifactStore::new(layout.clone()),
            layout,
            config,
        }
    }
}

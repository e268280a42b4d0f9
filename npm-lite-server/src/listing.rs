//! Package listing by directory walk.

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{AppError, AppResult};
use crate::layout::StorageLayout;

/// Walks the storage tree and returns the identifier of every stored manifest
/// (`pkg-a`, `@scope/pkg-b`, ...), in walk order.
///
/// Only regular files named exactly `*.json` count. A storage root that does
/// not exist yet lists as empty.
pub fn list_packages_blocking(layout: &StorageLayout) -> Vec<String> {
    let root = layout.root();
    if !root.exists() {
        debug!(root = %root.display(), "Storage root does not exist yet");
        return Vec::new();
    }

    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable storage entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| layout.identifier_for(entry.path()))
        .collect()
}

/// Async wrapper running the walk on the blocking pool.
pub async fn list_packages(layout: &StorageLayout) -> AppResult<Vec<String>> {
    let layout = layout.clone();
    let packages = tokio::task::spawn_blocking(move || list_packages_blocking(&layout))
        .await
        .map_err(|e| AppError::InternalError(format!("Package listing task failed: {}", e)))?;

    debug!(count = packages.len(), "Listed packages");
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_lists_scoped_and_unscoped_manifests() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("@scope")).unwrap();
        std::fs::write(root.join("pkg-a.json"), "{}").unwrap();
        std::fs::write(root.join("@scope/pkg-b.json"), "{}").unwrap();
        std::fs::write(root.join("@scope/pkg-b-1.0.0.tgz"), "tar").unwrap();
        std::fs::write(root.join("foo.json.bak"), "{}").unwrap();

        let mut packages = list_packages(&StorageLayout::new(root)).await.unwrap();
        packages.sort();

        assert_eq!(packages, vec!["@scope/pkg-b", "pkg-a"]);
    }

    #[tokio::test]
    async fn test_missing_root_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let layout = StorageLayout::new(temp_dir.path().join("not-created"));
        assert!(list_packages(&layout).await.unwrap().is_empty());
    }

    #[test]
    fn test_directories_named_json_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("odd.json")).unwrap();
        assert!(list_packages_blocking(&StorageLayout::new(temp_dir.path())).is_empty());
    }
}

use crate::error::{AppError, AppResult};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

/// Outcome of reading a manifest document from disk.
#[derive(Debug)]
pub enum ManifestRead {
    /// The file exists and holds a JSON object.
    Found(Map<String, Value>),
    /// No file at the path.
    Absent,
    /// The file exists but could not be read or is not a JSON object.
    Malformed(String),
}

/// Save file content to the specified path, creating parent directories first.
///
/// Parent creation is recursive and tolerates directories that already exist
/// or appear concurrently. An existing file is overwritten.
pub async fn save_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, content: C) -> AppResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
        debug!(parent = %parent.display(), "Ensured parent directory");
    }

    let content = content.as_ref();
    fs::write(path, content).await?;
    info!(
        path = %path.display(),
        size = content.len(),
        "File saved successfully"
    );
    Ok(())
}

/// Read a regular file in full.
///
/// Missing paths and anything that is not a regular file are reported as
/// [`AppError::NotFound`].
pub async fn read_file<P: AsRef<Path>>(path: P) -> AppResult<Vec<u8>> {
    let path = path.as_ref();

    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!(
                "File not found: {}",
                path.display()
            )))
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(AppError::NotFound(format!(
            "Not a regular file: {}",
            path.display()
        )));
    }

    let content = fs::read(path).await?;
    debug!(path = %path.display(), size = content.len(), "File read");
    Ok(content)
}

/// Read and parse a manifest document.
pub async fn read_manifest<P: AsRef<Path>>(path: P) -> ManifestRead {
    let path = path.as_ref();

    let content = match fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "Manifest not present");
            return ManifestRead::Absent;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read manifest");
            return ManifestRead::Malformed(e.to_string());
        }
    };

    match serde_json::from_slice::<Value>(&content) {
        Ok(Value::Object(manifest)) => ManifestRead::Found(manifest),
        Ok(other) => {
            warn!(path = %path.display(), "Manifest is not a JSON object");
            ManifestRead::Malformed(format!("expected a JSON object, found {}", json_kind(&other)))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Manifest is not valid JSON");
            ManifestRead::Malformed(e.to_string())
        }
    }
}

/// Serialize a manifest and write it to `path`.
pub async fn write_manifest<P: AsRef<Path>>(path: P, manifest: &Map<String, Value>) -> AppResult<()> {
    let serialized = serde_json::to_vec(manifest)?;
    save_file(path, serialized).await
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_file_creates_parents_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("@scope/pkg-1.0.0.tgz");

        save_file(&path, b"first").await.unwrap();
        save_file(&path, b"second").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_read_file_requires_regular_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pkg-1.0.0.tgz");
        std::fs::write(&path, b"bytes").unwrap();

        assert_eq!(read_file(&path).await.unwrap(), b"bytes");
        assert!(matches!(
            read_file(temp_dir.path().join("missing.tgz")).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            read_file(temp_dir.path()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_read_manifest_outcomes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        assert!(matches!(
            read_manifest(root.join("missing.json")).await,
            ManifestRead::Absent
        ));

        std::fs::write(root.join("broken.json"), "{not json").unwrap();
        assert!(matches!(
            read_manifest(root.join("broken.json")).await,
            ManifestRead::Malformed(_)
        ));

        std::fs::write(root.join("array.json"), "[1, 2]").unwrap();
        assert!(matches!(
            read_manifest(root.join("array.json")).await,
            ManifestRead::Malformed(_)
        ));

        std::fs::write(root.join("ok.json"), r#"{"name":"ok","versions":{}}"#).unwrap();
        match read_manifest(root.join("ok.json")).await {
            ManifestRead::Found(manifest) => assert_eq!(manifest["name"], "ok"),
            other => panic!("expected manifest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_write_manifest_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("@scope/pkg.json");
        let manifest = json!({"name": "@scope/pkg", "versions": {"1.0.0": {}}});

        write_manifest(&path, manifest.as_object().unwrap())
            .await
            .unwrap();

        let stored: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored, manifest);
    }
}

//! # Configuration Management
//!
//! Server settings are read from an optional JSON file and fall back to the
//! defaults embedded from `config.json`:
//!
//! ```json
//! {
//!   "server": { "host": "0.0.0.0", "port": 4873 },
//!   "storage": { "root": "./files" },
//!   "limits": { "max_upload_size_mb": 100, "max_request_body_size_mb": 150 }
//! }
//! ```
//!
//! Command-line flags override whatever the file provides.

use crate::error::AppResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for the registry server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Listen address
    pub server: ServerConfig,
    /// Where manifests and tarballs live
    pub storage: StorageConfig,
    /// Upload and request limits (defaults applied if not specified)
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Server configuration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host/IP address to bind to (e.g., "0.0.0.0" or "localhost")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding every manifest and tarball
    pub root: PathBuf,
}

/// Upload and request limits configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest decoded tarball accepted on publish
    pub max_upload_size_mb: u64,
    /// Largest publish request body (the tarball travels base64-encoded inside it)
    pub max_request_body_size_mb: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_upload_size_mb: 100,
            max_request_body_size_mb: 150,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not match the configuration
    /// format.
    pub fn load<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config_str = fs::read_to_string(path)?;
        let config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Load configuration from file with fallback to defaults when the file
    /// does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.limits.max_upload_size_mb * 1024 * 1024
    }

    /// Get the maximum request body size in bytes.
    pub fn max_request_body_size_bytes(&self) -> usize {
        self.limits.max_request_body_size_mb * 1024 * 1024
    }
}

impl Default for Config {
    fn default() -> Self {
        serde_json::from_str(include_str!("../config.json"))
            .expect("Failed to parse embedded config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 4873);
        assert_eq!(config.storage.root, PathBuf::from("./files"));
        assert_eq!(config.limits, LimitsConfig::default());
        assert_eq!(config.max_upload_size_bytes(), 100 * 1024 * 1024);
    }

    #[test]
    fn test_load_without_limits_section() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.json");
        std::fs::write(
            &path,
            r#"{"server": {"host": "127.0.0.1", "port": 9000}, "storage": {"root": "/srv/npm"}}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.root, PathBuf::from("/srv/npm"));
        assert_eq!(config.limits.max_request_body_size_mb, 150);
    }

    #[test]
    fn test_load_or_default() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.json");
        assert_eq!(Config::load_or_default(&missing).unwrap(), Config::default());

        let broken = temp_dir.path().join("broken.json");
        std::fs::write(&broken, "{").unwrap();
        assert!(Config::load_or_default(&broken).is_err());
    }
}

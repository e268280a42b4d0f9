//! Shared helpers for the registry integration tests.

#![allow(dead_code)]

use anyhow::Result;
use axum_test::TestServer;
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use npm_lite_server::{build_router, AppState, Config};

/// A registry rooted in a temporary directory, plus an in-process test server.
pub struct TestSetup {
    pub temp_dir: TempDir,
    pub app_state: Arc<AppState>,
    pub server: TestServer,
}

/// Creates a registry with the default configuration.
pub fn create_test_setup() -> Result<TestSetup> {
    create_test_setup_with(Config::default())
}

/// Creates a registry with `config`, pointing its storage root at a fresh
/// temporary directory.
pub fn create_test_setup_with(mut config: Config) -> Result<TestSetup> {
    let temp_dir = TempDir::new()?;
    config.storage.root = temp_dir.path().to_path_buf();

    let app_state = Arc::new(AppState::new(temp_dir.path(), Arc::new(config)));
    let server = TestServer::new(build_router(app_state.clone()))?;

    Ok(TestSetup {
        temp_dir,
        app_state,
        server,
    })
}

/// Name of the tarball attachment npm sends for `name@version`.
pub fn tarball_name(name: &str, version: &str) -> String {
    format!("{}-{}.tgz", name, version)
}

/// Builds the JSON document `npm publish` sends for a single version.
pub fn publish_payload(name: &str, version: &str, tarball: &[u8]) -> Value {
    json!({
        "_id": name,
        "name": name,
        "dist-tags": { "latest": version },
        "versions": {
            version: {
                "name": name,
                "version": version,
                "dist": {
                    "tarball": format!("http://localhost:4873/{}/-/{}", name, tarball_name(name, version))
                }
            }
        },
        "_attachments": {
            tarball_name(name, version): {
                "content_type": "application/octet-stream",
                "data": general_purpose::STANDARD.encode(tarball),
                "length": tarball.len()
            }
        }
    })
}

/// Path segment npm uses when publishing: scoped names keep the `/` encoded.
pub fn publish_path(name: &str) -> String {
    format!("/{}", name.replace('/', "%2f"))
}

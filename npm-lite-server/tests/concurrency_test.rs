//! Concurrent publish tests.
//!
//! Publishes of one package run their read-merge-write under a shared lock,
//! so no version recorded by one publish may be lost to another.

use serde_json::Value;
use std::sync::Arc;

mod common;
use common::{create_test_setup, publish_payload};
use npm_lite_server::{publish, AppState, PackageId};

async fn publish_versions(state: Arc<AppState>, name: &'static str, versions: Vec<String>) {
    let tasks: Vec<_> = versions
        .into_iter()
        .map(|version| {
            let state = state.clone();
            tokio::spawn(async move {
                let payload = publish_payload(name, &version, version.as_bytes());
                publish::publish(&state, name, payload).await.unwrap();
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publishes_keep_every_version() {
    let setup = create_test_setup().unwrap();
    let versions: Vec<String> = (0..16).map(|minor| format!("1.{}.0", minor)).collect();

    publish_versions(setup.app_state.clone(), "pkg", versions.clone()).await;

    let manifest = setup
        .app_state
        .manifests
        .lookup(&PackageId::parse("pkg").unwrap())
        .await
        .unwrap();
    let stored = manifest["versions"].as_object().unwrap();
    assert_eq!(stored.len(), versions.len());
    for version in &versions {
        assert!(stored.contains_key(version), "lost version {}", version);
        assert!(setup
            .temp_dir
            .path()
            .join(format!("pkg-{}.tgz", version))
            .is_file());
    }

    assert!(setup.app_state.manifests.locks().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publishes_across_packages() {
    let setup = create_test_setup().unwrap();
    let versions: Vec<String> = (0..8).map(|patch| format!("0.1.{}", patch)).collect();

    tokio::join!(
        publish_versions(setup.app_state.clone(), "pkg-a", versions.clone()),
        publish_versions(setup.app_state.clone(), "@scope/pkg-b", versions.clone()),
    );

    let response = setup.server.get("/@scope/pkg-b").await;
    response.assert_status_ok();
    let manifest: Value = response.json();
    assert_eq!(manifest["versions"].as_object().unwrap().len(), versions.len());

    let manifest: Value = setup.server.get("/pkg-a").await.json();
    assert_eq!(manifest["versions"].as_object().unwrap().len(), versions.len());
}

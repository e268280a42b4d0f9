//! HTTP server setup: route table, middleware stack and the listen loop.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{api, config::Config, state::AppState, validation};

/// Builds the registry router.
///
/// Dispatch order per request: tracing, body limit, tarball interception,
/// then the route table (with a not-found fallback).
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_request_body_size_bytes();

    Router::new()
        .route("/", get(api::list_packages))
        .route(
            "/{package}",
            get(api::package_manifest).put(api::publish_package),
        )
        .route("/{scope}/{name}", get(api::scoped_manifest))
        .fallback(api::fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::tarball_interceptor,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Creates the storage root if needed and returns its absolute path.
pub fn prepare_storage_root(root: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(root)
        .with_context(|| format!("Failed to create storage root {}", root.display()))?;
    std::fs::canonicalize(root)
        .with_context(|| format!("Failed to resolve storage root {}", root.display()))
}

/// Runs the registry until the listener fails.
pub async fn run_server(config: Config) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;

    validation::validate_hostname(&host).map_err(|e| {
        error!(host = %host, error = %e, "Invalid host parameter");
        anyhow::anyhow!("Invalid host parameter '{}': {}", host, e)
    })?;
    validation::validate_port(port).map_err(|e| {
        error!(port = %port, error = %e, "Invalid port parameter");
        anyhow::anyhow!("Invalid port parameter {}: {}", port, e)
    })?;

    let root = prepare_storage_root(&config.storage.root)?;
    info!(root = %root.display(), "Using storage root");

    let state = Arc::new(AppState::new(root, Arc::new(config)));
    let app = build_router(state);

    let addr: SocketAddr = match host.parse::<std::net::IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, port),
        Err(_) => tokio::net::lookup_host((host.as_str(), port))
            .await
            .with_context(|| format!("Failed to resolve {}:{}", host, port))?
            .next()
            .with_context(|| format!("No address found for {}:{}", host, port))?,
    };

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        error!(addr = %addr, error = %e, "Failed to bind to address");
        anyhow::anyhow!("Failed to bind to {}: {}", addr, e)
    })?;

    info!("Registry listening on http://{}", addr);
    axum::serve(listener, app).await.map_err(|e| {
        error!(error = %e, "Server error");
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}

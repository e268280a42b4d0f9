//! HTTP handlers for the npm client protocol.
//!
//! | Route                   | Handler                |
//! |-------------------------|------------------------|
//! | `PUT /{package}`        | [`publish_package`]    |
//! | `GET /`                 | [`list_packages`]      |
//! | `GET /{scope}/{name}`   | [`scoped_manifest`]    |
//! | `GET /{package}`        | [`package_manifest`]   |
//! | any `*.tgz` path        | [`tarball_interceptor`]|
//!
//! The tarball interceptor runs ahead of the route table: it answers when a
//! stored tarball matches the request and otherwise hands the request on.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path as AxumPath, Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::artifact::tarball_relative_path;
use crate::error::{AppError, AppResult};
use crate::layout::PackageId;
use crate::listing;
use crate::publish;
use crate::state::AppState;

/// Body returned by a successful publish.
pub const PUBLISH_OK: &str = "OK";

/// Publishes a package version.
///
/// # Route
/// `PUT /{package}` (scoped names arrive as `@scope%2fname`)
///
/// Stores the first attachment as a tarball and merges the remaining manifest
/// into the stored one. Answers `OK` in plain text.
///
/// # Error Conditions
/// - Body is not a JSON object (400)
/// - `_attachments` missing, empty, or without string `data` (400)
/// - Malformed base64 or unsafe attachment name (400)
/// - Decoded tarball larger than the configured limit (413)
/// - File system write errors (500)
pub async fn publish_package(
    AxumPath(package): AxumPath<String>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<&'static str> {
    debug!(package = %package, size = body.len(), "Incoming publish request");

    let payload: Value = serde_json::from_slice(&body)?;
    publish::publish(&state, &package, payload).await?;

    Ok(PUBLISH_OK)
}

/// Lists every stored package identifier as a JSON array of strings.
///
/// # Route
/// `GET /`
pub async fn list_packages(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<String>>> {
    let packages = listing::list_packages(&state.layout).await?;
    Ok(Json(packages))
}

/// Serves the manifest of a scoped package.
///
/// # Route
/// `GET /{scope}/{name}`, e.g. `GET /@scope/pkg`
pub async fn scoped_manifest(
    AxumPath((scope, name)): AxumPath<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Map<String, Value>>> {
    let package = PackageId::new(Some(&scope), &name).map_err(|e| {
        AppError::NotFound(format!("Invalid package '{}/{}': {}", scope, name, e))
    })?;
    serve_manifest(&state, &package).await
}

/// Serves the manifest named by a single, already URL-decoded path segment.
///
/// # Route
/// `GET /{package}`, e.g. `GET /left-pad` or `GET /@scope%2fpkg`
pub async fn package_manifest(
    AxumPath(package): AxumPath<String>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Map<String, Value>>> {
    let package = PackageId::parse(&package)
        .map_err(|e| AppError::NotFound(format!("Invalid package '{}': {}", package, e)))?;
    serve_manifest(&state, &package).await
}

async fn serve_manifest(
    state: &AppState,
    package: &PackageId,
) -> AppResult<Json<Map<String, Value>>> {
    debug!(package = %package, "Incoming manifest request");
    let manifest = state.manifests.lookup(package).await?;
    Ok(Json(manifest))
}

/// Serves a stored tarball before routing takes place.
///
/// Requests whose path ends in `.tgz` are resolved to
/// `<root>/<part after "/-/">`. When that file exists, its bytes are the
/// response; otherwise the request continues to the route table unchanged.
pub async fn tarball_interceptor(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(relative) = tarball_relative_path(request.uri().path()) else {
        return next.run(request).await;
    };

    match state.artifacts.read(&relative).await {
        Some((tarball, path)) => {
            info!(tarball = %relative, path = %path.display(), size = tarball.len(), "Serving tarball");
            tarball.into_response()
        }
        None => {
            debug!(tarball = %relative, "No stored tarball, continuing to routes");
            next.run(request).await
        }
    }
}

/// Answers every request no route claims.
pub async fn fallback(uri: Uri) -> AppError {
    debug!(uri = %uri, "No route matched");
    AppError::NotFound(format!("No route for {}", uri.path()))
}

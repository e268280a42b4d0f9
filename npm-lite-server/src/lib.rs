//! # npm-lite
//!
//! A minimal private npm registry. It accepts `npm publish` uploads, keeps
//! manifests and tarballs as plain files under one storage root, and serves
//! them back to `npm install`.
//!
//! ## Key Modules
//!
//! - [`api`]: HTTP handlers, including the pre-routing tarball interceptor
//! - [`server`]: router assembly and the listen loop
//! - [`publish`]: splitting publish payloads into manifest and tarball
//! - [`manifest`]: manifest lookup and the version-merging update
//! - [`artifact`]: tarball ingestion and retrieval
//! - [`listing`]: enumerating stored packages
//! - [`layout`]: the single place storage paths are resolved
//! - [`locks`]: per-package serialization of manifest updates
//! - [`config`], [`state`], [`error`], [`validation`]: supporting pieces

pub mod api;
pub mod artifact;
pub mod config;
pub mod error;
pub mod layout;
pub mod listing;
pub mod locks;
pub mod manifest;
pub mod publish;
pub mod server;
pub mod state;
pub mod storage;
pub mod validation;

pub use config::Config;
pub use error::{ApiErrorResponse, AppError, AppResult, ErrorCode};
pub use layout::{PackageId, StorageLayout};
pub use server::{build_router, run_server};
pub use state::AppState;

//! # Input Validation Utilities
//!
//! Checks applied to everything a client controls before it reaches the
//! filesystem or the network layer: attachment names, package identifiers,
//! base64 payloads and the listen address.

pub mod error;
pub mod limits;
pub mod network;
pub mod paths;
pub mod payload;

pub use self::{
    error::ValidationError,
    limits::{
        max_base64_encoded_size, validate_file_size, MAX_BASE64_ENCODED_SIZE,
        MAX_PACKAGE_NAME_LENGTH, MAX_PATH_DEPTH, MAX_SEGMENT_LENGTH, MAX_UPLOAD_SIZE,
    },
    network::{validate_hostname, validate_port},
    paths::{validate_package_segment, validate_safe_path},
    payload::{validate_base64_characters, validate_base64_size},
};

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

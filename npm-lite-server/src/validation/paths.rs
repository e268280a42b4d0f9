//! # Input Validation: Path and Segment Validation
//!
//! Attachment names and package identifiers become filesystem paths under the
//! storage root, so they are checked here before any path is built from them.

use super::limits::{MAX_PATH_DEPTH, MAX_SEGMENT_LENGTH};
use super::{ValidationError, ValidationResult};
use std::path::{Component, Path, PathBuf};

fn check_characters(input: &str) -> ValidationResult<()> {
    if input.contains('\0') {
        return Err(ValidationError::NullBytes);
    }

    if input.chars().any(|c| c.is_control()) {
        return Err(ValidationError::ControlCharacters);
    }

    Ok(())
}

/// Validate that a relative path stays inside the directory it is joined to.
///
/// Rejects absolute paths, `.`/`..` components, backslashes, empty segments
/// and paths deeper than [`MAX_PATH_DEPTH`].
///
/// ```rust
/// use npm_lite_server::validation::validate_safe_path;
///
/// assert!(validate_safe_path("@scope/pkg-1.0.0.tgz").is_ok());
/// assert!(validate_safe_path("../../etc/passwd").is_err());
/// assert!(validate_safe_path("/etc/passwd").is_err());
/// ```
pub fn validate_safe_path<P: AsRef<Path>>(path: P) -> ValidationResult<PathBuf> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    if path_str.is_empty() {
        return Err(ValidationError::TooShort { actual: 0, min: 1 });
    }

    check_characters(&path_str)?;

    if path.is_absolute() || path_str.starts_with('/') || path_str.starts_with('\\') {
        return Err(ValidationError::AbsolutePath {
            path: path_str.to_string(),
        });
    }

    if path_str.contains('\\') || path_str.contains("//") {
        return Err(ValidationError::InvalidCharacters {
            input: path_str.to_string(),
        });
    }

    let mut depth = 0;
    for component in path.components() {
        match component {
            Component::Normal(segment) => {
                if segment.len() > MAX_SEGMENT_LENGTH {
                    return Err(ValidationError::TooLong {
                        actual: segment.len(),
                        max: MAX_SEGMENT_LENGTH,
                    });
                }
                depth += 1;
            }
            Component::ParentDir | Component::CurDir => {
                return Err(ValidationError::PathTraversal {
                    path: path_str.to_string(),
                });
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ValidationError::AbsolutePath {
                    path: path_str.to_string(),
                });
            }
        }
    }

    if depth > MAX_PATH_DEPTH {
        return Err(ValidationError::PathTooDeep {
            actual: depth,
            max: MAX_PATH_DEPTH,
        });
    }

    Ok(path.to_path_buf())
}

/// Validate one segment of a package identifier (a scope or a bare name).
pub fn validate_package_segment(segment: &str) -> ValidationResult<&str> {
    if segment.is_empty() {
        return Err(ValidationError::TooShort { actual: 0, min: 1 });
    }

    if segment.len() > MAX_SEGMENT_LENGTH {
        return Err(ValidationError::TooLong {
            actual: segment.len(),
            max: MAX_SEGMENT_LENGTH,
        });
    }

    check_characters(segment)?;

    if segment == "." || segment == ".." {
        return Err(ValidationError::PathTraversal {
            path: segment.to_string(),
        });
    }

    if segment.contains('/') || segment.contains('\\') {
        return Err(ValidationError::InvalidCharacters {
            input: segment.to_string(),
        });
    }

    Ok(segment)
}

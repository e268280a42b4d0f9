//! # Input Validation: Size Limits

use super::{ValidationError, ValidationResult};

/// Default maximum decoded tarball size (100 MB)
pub const MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Default maximum base64 payload length, sized for `MAX_UPLOAD_SIZE` after encoding
pub const MAX_BASE64_ENCODED_SIZE: usize = (MAX_UPLOAD_SIZE as usize / 3 + 1) * 4;

/// Maximum package name length accepted by the npm client
pub const MAX_PACKAGE_NAME_LENGTH: usize = 214;

/// Maximum length of a single path segment
pub const MAX_SEGMENT_LENGTH: usize = 255;

/// Maximum number of components in a stored relative path
pub const MAX_PATH_DEPTH: usize = 8;

/// Longest base64 text that can decode to at most `max_decoded` bytes.
pub fn max_base64_encoded_size(max_decoded: u64) -> usize {
    let encoded = (max_decoded / 3).saturating_add(1).saturating_mul(4);
    usize::try_from(encoded).unwrap_or(usize::MAX)
}

/// Validate file size against limits.
///
/// `max_size` defaults to [`MAX_UPLOAD_SIZE`].
pub fn validate_file_size(size: u64, max_size: Option<u64>) -> ValidationResult<()> {
    let limit = max_size.unwrap_or(MAX_UPLOAD_SIZE);

    if size > limit {
        return Err(ValidationError::FileTooLarge {
            actual: size,
            max: limit,
        });
    }

    Ok(())
}

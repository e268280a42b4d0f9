//! # Input Validation: Publish Payloads

use super::limits::MAX_BASE64_ENCODED_SIZE;
use super::{ValidationError, ValidationResult};

/// Validate the size of base64 encoded data before decoding it.
///
/// `max_decoded_size` bounds the decoded length (3 bytes per 4 characters,
/// less trailing padding); `max_encoded_size` defaults to
/// [`MAX_BASE64_ENCODED_SIZE`].
pub fn validate_base64_size(
    encoded_data: &str,
    max_encoded_size: Option<usize>,
    max_decoded_size: Option<u64>,
) -> ValidationResult<()> {
    let encoded_limit = max_encoded_size.unwrap_or(MAX_BASE64_ENCODED_SIZE);

    if encoded_data.len() > encoded_limit {
        return Err(ValidationError::FileTooLarge {
            actual: encoded_data.len() as u64,
            max: encoded_limit as u64,
        });
    }

    if let Some(decoded_limit) = max_decoded_size {
        let padding = encoded_data.bytes().rev().take_while(|&b| b == b'=').count() as u64;
        let estimated_decoded_size = ((encoded_data.len() as u64 * 3) / 4).saturating_sub(padding);
        if estimated_decoded_size > decoded_limit {
            return Err(ValidationError::FileTooLarge {
                actual: estimated_decoded_size,
                max: decoded_limit,
            });
        }
    }

    Ok(())
}

/// Validate that base64 data contains only characters of the standard alphabet.
///
/// Empty data is accepted: it decodes to an empty tarball.
pub fn validate_base64_characters(data: &str) -> ValidationResult<()> {
    if !data
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=')
    {
        return Err(ValidationError::InvalidCharacters {
            input: "Invalid base64 characters detected".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_size_limits() {
        let valid_base64 = "SGVsbG8gV29ybGQ="; // "Hello World"
        assert!(validate_base64_size(valid_base64, None, None).is_ok());
        assert!(validate_base64_size(valid_base64, Some(4), None).is_err());
        assert!(validate_base64_size(valid_base64, None, Some(4)).is_err());
        assert!(validate_base64_size(valid_base64, None, Some(11)).is_ok());
        assert!(validate_base64_size(valid_base64, None, Some(10)).is_err());
    }

    #[test]
    fn test_base64_characters() {
        assert!(validate_base64_characters("SGVsbG8gV29ybGQ=").is_ok());
        assert!(validate_base64_characters("").is_ok());
        assert!(validate_base64_characters("not base64!").is_err());
    }
}

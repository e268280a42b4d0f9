//! # Input Validation: Listen Address

use super::{ValidationError, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::IpAddr;

/// Regex for validating hostnames (RFC 1123 compliant)
static HOSTNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$")
        .expect("Hostname regex should compile - this is a static RFC 1123 pattern")
});

/// Validate a hostname or IP address to bind to.
pub fn validate_hostname(hostname: &str) -> ValidationResult<String> {
    if hostname.is_empty() {
        return Err(ValidationError::TooShort { actual: 0, min: 1 });
    }

    if hostname.len() > 253 {
        return Err(ValidationError::TooLong {
            actual: hostname.len(),
            max: 253,
        });
    }

    if hostname.contains('\0') {
        return Err(ValidationError::NullBytes);
    }

    if hostname.chars().any(|c| c.is_control()) {
        return Err(ValidationError::ControlCharacters);
    }

    if hostname.parse::<IpAddr>().is_ok() {
        return Ok(hostname.to_string());
    }

    if !HOSTNAME_REGEX.is_match(hostname) {
        return Err(ValidationError::InvalidCharacters {
            input: hostname.to_string(),
        });
    }

    Ok(hostname.to_string())
}

/// Validate a port to listen on. Port 0 is rejected.
pub fn validate_port(port: u16) -> ValidationResult<u16> {
    if port == 0 {
        return Err(ValidationError::InvalidFormat {
            reason: "Port 0 is not a valid listen port".to_string(),
        });
    }

    Ok(port)
}

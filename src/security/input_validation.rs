/*
 * Copyright (C) 2026 Marc Rivero López
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

//! Input Validation Module
//!
//! Everything interpolated into the `sh -c` string run inside a probe pod
//! passes through here first.
//!
//! # Security Standards
//! - CWE-78: OS Command Injection
//! - OWASP A03:2021 - Injection

use std::net::IpAddr;
use thiserror::Error;

/// Maximum length for hostname (RFC 1035)
const MAX_HOSTNAME_LENGTH: usize = 253;

/// Maximum length for label in hostname (RFC 1035)
const MAX_LABEL_LENGTH: usize = 63;

/// Characters that carry meaning for a POSIX shell
const SHELL_METACHARACTERS: [char; 17] = [
    '|', '&', ';', '$', '`', '\n', '\r', '<', '>', '(', ')', '{', '}', '\\', '\'', '"', ' ',
];

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid hostname: {0}")]
    InvalidHostname(String),
    #[error("Invalid port: {0}")]
    InvalidPort(String),
    #[error("Invalid cipher: {0}")]
    InvalidCipher(String),
    #[error("Invalid command path: {0}")]
    InvalidCommandPath(String),
    #[error("Invalid Kubernetes name: {0}")]
    InvalidResourceName(String),
}

/// Validate hostname according to RFC 1035 and RFC 1123
///
/// IP literals (v4 and v6) are accepted as-is.
pub fn validate_hostname(hostname: &str) -> std::result::Result<(), ValidationError> {
    if hostname.is_empty() {
        return Err(ValidationError::InvalidHostname(
            "Hostname cannot be empty".to_string(),
        ));
    }

    if hostname.len() > MAX_HOSTNAME_LENGTH {
        return Err(ValidationError::InvalidHostname(format!(
            "Hostname too long (max {} characters)",
            MAX_HOSTNAME_LENGTH
        )));
    }

    if let Some(ch) = hostname.chars().find(|c| SHELL_METACHARACTERS.contains(c)) {
        return Err(ValidationError::InvalidHostname(format!(
            "Hostname contains forbidden character: '{}'",
            ch.escape_default()
        )));
    }

    if hostname.contains('/') {
        return Err(ValidationError::InvalidHostname(
            "Hostname cannot contain path separators".to_string(),
        ));
    }

    if hostname.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    // Cluster DNS names may carry a trailing dot
    let fqdn = hostname.strip_suffix('.').unwrap_or(hostname);

    for label in fqdn.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL_LENGTH {
            return Err(ValidationError::InvalidHostname(format!(
                "Label '{}' has invalid length (must be 1-{} characters)",
                label, MAX_LABEL_LENGTH
            )));
        }

        let bytes = label.as_bytes();
        let valid = bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'-')
            && bytes[0] != b'-'
            && bytes[bytes.len() - 1] != b'-';
        if !valid {
            return Err(ValidationError::InvalidHostname(format!(
                "Label '{}' contains invalid character or invalid position for hyphen",
                label
            )));
        }
    }

    Ok(())
}

/// Validate port number (0 is rejected)
pub fn validate_port(port: u16) -> std::result::Result<(), ValidationError> {
    if port == 0 {
        return Err(ValidationError::InvalidPort(
            "Port must be between 1 and 65535".to_string(),
        ));
    }
    Ok(())
}

/// Validate OpenSSL cipher string
///
/// Allows cipher names plus the OpenSSL cipher string syntax, including
/// `@SECLEVEL=0` directives.
pub fn validate_cipher(cipher: &str) -> std::result::Result<(), ValidationError> {
    if cipher.is_empty() {
        return Err(ValidationError::InvalidCipher(
            "Cipher cannot be empty".to_string(),
        ));
    }

    if cipher.len() > 2048 {
        return Err(ValidationError::InvalidCipher(
            "Cipher string too long".to_string(),
        ));
    }

    for ch in cipher.chars() {
        match ch {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | ':' | '!' | '+' | '@' | '=' => {
                continue;
            }
            _ => {
                return Err(ValidationError::InvalidCipher(format!(
                    "Cipher contains invalid character: '{}'",
                    ch.escape_default()
                )));
            }
        }
    }

    Ok(())
}

/// Validate the path of an executable interpolated into a shell command
pub fn validate_command_path(path: &str) -> std::result::Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::InvalidCommandPath(
            "Command path cannot be empty".to_string(),
        ));
    }

    if let Some(ch) = path
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '-' | '_')))
    {
        return Err(ValidationError::InvalidCommandPath(format!(
            "Command path contains invalid character: '{}'",
            ch.escape_default()
        )));
    }

    Ok(())
}

/// Validate a namespace, pod or container name (RFC 1123 subdomain)
pub fn validate_resource_name(name: &str) -> std::result::Result<(), ValidationError> {
    if name.is_empty() || name.len() > MAX_HOSTNAME_LENGTH {
        return Err(ValidationError::InvalidResourceName(format!(
            "'{}' must be 1-{} characters",
            name, MAX_HOSTNAME_LENGTH
        )));
    }

    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
    let valid_edges = name
        .chars()
        .next()
        .zip(name.chars().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());

    if !valid_chars || !valid_edges {
        return Err(ValidationError::InvalidResourceName(format!(
            "'{}' is not a valid RFC 1123 name",
            name
        )));
    }

    Ok(())
}

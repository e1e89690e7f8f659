//! # Error Types
//!
//! Errors for parsing shared identifier types from external representations.

use thiserror::Error;

/// Errors raised when parsing identifiers from watcher-supplied strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentifierError {
    /// Hex string could not be decoded.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded byte length does not match the target type.
    #[error("Invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

/// Parse a 32-byte hash from a hex string (with or without `0x` prefix).
pub fn parse_hash(s: &str) -> Result<crate::Hash, IdentifierError> {
    let bytes = decode_hex(s)?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| IdentifierError::InvalidLength {
            expected: 32,
            got: v.len(),
        })
}

/// Parse a 20-byte adapter address from a hex string.
pub fn parse_adapter(s: &str) -> Result<crate::AdapterId, IdentifierError> {
    let bytes = decode_hex(s)?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| IdentifierError::InvalidLength {
            expected: 20,
            got: v.len(),
        })
}

/// Parse arbitrary-length bytes from a hex string.
pub fn parse_bytes(s: &str) -> Result<Vec<u8>, IdentifierError> {
    decode_hex(s)
}

fn decode_hex(s: &str) -> Result<Vec<u8>, IdentifierError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(stripped).map_err(|e| IdentifierError::InvalidHex(e.to_string()))
}

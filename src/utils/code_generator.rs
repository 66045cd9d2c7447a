//! Short code derivation and validation utilities.
//!
//! Codes are derived from the SHA-256 digest of the original URL, encoded in
//! base 62. The same URL always yields the same sequence of candidates, one
//! per length of the retry ladder.

use sha2::{Digest, Sha256};
use std::ops::RangeInclusive;

/// Base-62 alphabet, digits first.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Shortest derived code.
pub const MIN_CODE_LENGTH: usize = 7;

/// Longest derived code; the ladder gives up after this length.
pub const MAX_CODE_LENGTH: usize = 10;

/// Prefix lengths tried in order when deriving a code.
pub const CODE_LENGTHS: RangeInclusive<usize> = MIN_CODE_LENGTH..=MAX_CODE_LENGTH;

/// Length bounds for caller-chosen codes.
const CUSTOM_CODE_MIN: usize = 4;
const CUSTOM_CODE_MAX: usize = 32;

/// Codes that would shadow HTTP routes.
const RESERVED_CODES: &[&str] = &["api", "health"];

/// Reasons a caller-chosen code is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeValidationError {
    #[error("Custom code must be 4-32 characters, got {0}")]
    Length(usize),

    #[error("Custom code can only contain ASCII letters, digits, and hyphens")]
    InvalidCharacters,

    #[error("Custom code cannot start or end with a hyphen")]
    HyphenAtEdge,

    #[error("Custom code '{0}' is reserved")]
    Reserved(String),
}

/// Candidate codes derived from one URL's digest.
///
/// # Examples
///
/// ```ignore
/// let candidates = CodeCandidates::derive("https://example.com/a");
/// assert_eq!(candidates.at(7).len(), 7);
/// assert!(candidates.at(8).starts_with(candidates.at(7)));
/// ```
#[derive(Debug, Clone)]
pub struct CodeCandidates {
    encoded: String,
}

impl CodeCandidates {
    /// Hashes `original_url` and encodes the digest.
    pub fn derive(original_url: &str) -> Self {
        let digest = Sha256::digest(original_url.as_bytes());
        let encoded = encode_base62(&digest);

        Self {
            encoded: format!("{encoded:0>width$}", width = MAX_CODE_LENGTH),
        }
    }

    /// Returns the candidate of the given length.
    pub fn at(&self, length: usize) -> &str {
        &self.encoded[..length.min(self.encoded.len())]
    }

    /// Iterates the ladder's candidates, shortest first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        CODE_LENGTHS.map(move |length| (length, self.at(length)))
    }
}

/// Encodes bytes as a big-endian base-62 number.
///
/// Each leading zero byte is kept as a leading `'0'` so distinct inputs of the
/// same length never encode identically.
pub fn encode_base62(bytes: &[u8]) -> String {
    let zeros = bytes.iter().take_while(|b| **b == 0).count();
    let mut number: Vec<u8> = bytes[zeros..].to_vec();
    let mut digits: Vec<u8> = Vec::with_capacity(bytes.len() * 2);

    while !number.is_empty() {
        let mut remainder: u32 = 0;
        let mut quotient = Vec::with_capacity(number.len());

        for &byte in &number {
            let acc = (remainder << 8) | u32::from(byte);
            let q = acc / 62;
            remainder = acc % 62;
            if !quotient.is_empty() || q != 0 {
                quotient.push(q as u8);
            }
        }

        digits.push(ALPHABET[remainder as usize]);
        number = quotient;
    }

    digits.extend(std::iter::repeat_n(b'0', zeros));
    digits.iter().rev().map(|&d| char::from(d)).collect()
}

/// Validates a caller-chosen short code.
///
/// # Rules
///
/// - Length: 4-32 characters
/// - Allowed characters: ASCII letters, digits, hyphens
/// - Cannot start or end with a hyphen
/// - Cannot be a reserved route name
pub fn validate_custom_code(code: &str) -> Result<(), CodeValidationError> {
    if code.len() < CUSTOM_CODE_MIN || code.len() > CUSTOM_CODE_MAX {
        return Err(CodeValidationError::Length(code.len()));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(CodeValidationError::InvalidCharacters);
    }

    if code.starts_with('-') || code.ends_with('-') {
        return Err(CodeValidationError::HyphenAtEdge);
    }

    if RESERVED_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
    {
        return Err(CodeValidationError::Reserved(code.to_string()));
    }

    Ok(())
}

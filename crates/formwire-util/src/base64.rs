//! Base64 helpers for binary and UTF-8 text payloads.
//!
//! Standard encoding is padded; URL-safe encoding is unpadded on output and
//! accepts either form on input.

use crate::error::UtilError;
use ::base64::Engine;
use ::base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

pub fn decode(encoded: &str) -> Result<Vec<u8>, UtilError> {
    Ok(STANDARD.decode(encoded.trim())?)
}

pub fn encode_url(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn decode_url(encoded: &str) -> Result<Vec<u8>, UtilError> {
    Ok(URL_SAFE_NO_PAD.decode(encoded.trim().trim_end_matches('='))?)
}

/// Encode UTF-8 text.
pub fn encode_text(text: &str) -> String {
    encode(text.as_bytes())
}

/// Decode to UTF-8 text, rejecting invalid sequences.
pub fn decode_text(encoded: &str) -> Result<String, UtilError> {
    Ok(String::from_utf8(decode(encoded)?)?)
}

use thiserror::Error;

/// Errors returned by the utility helpers.
#[derive(Debug, Error)]
pub enum UtilError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded bytes are not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

//! Error types for storage backends.

use formwire_protocol::{Problem, ProblemType, ProblemsError};
use thiserror::Error;

/// Errors returned by storage backends and the JSON store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    /// Encoding or decoding a stored value failed.
    #[error("storage json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StorageError> for ProblemsError {
    fn from(err: StorageError) -> Self {
        ProblemsError::single(Problem::new(ProblemType::Storage).with_reason(err.to_string()))
    }
}

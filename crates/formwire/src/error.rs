//! Errors raised while assembling or using the client stack.

use formwire_binder::BindError;
use formwire_config::ConfigError;
use formwire_protocol::{Problem, ProblemsError};
use formwire_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormwireError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Bind(#[from] BindError),
    /// The exchange failed before the server could judge the submission.
    #[error(transparent)]
    Exchange(#[from] ProblemsError),
    /// The server rejected a submitted form.
    ///
    /// Field problems were placed on their controls; `unplaced` holds the
    /// rest.
    #[error("submission rejected: {problems}")]
    Rejected {
        problems: ProblemsError,
        unplaced: Vec<Problem>,
    },
    /// A config value is well-formed but unusable.
    #[error("invalid setting at {path}: {message}")]
    InvalidSetting { path: String, message: String },
}

impl FormwireError {
    pub(crate) fn invalid_setting(path: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidSetting {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

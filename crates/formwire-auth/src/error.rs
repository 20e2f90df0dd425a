//! Error types for the OAuth flow.

use formwire_protocol::{Problem, ProblemType, ProblemsError};
use formwire_storage::StorageError;
use serde_json::json;
use thiserror::Error;

/// Errors returned by the OAuth client and token session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No login was started for this client, or it was already completed.
    #[error("no pending login for client {0}")]
    MissingPendingLogin(String),
    /// The callback state does not match the pending login.
    #[error("state mismatch in authorization callback")]
    StateMismatch,
    /// No usable tokens are available.
    #[error("not authenticated")]
    NotAuthenticated,
    /// The authorization server reported an error.
    #[error("authorization server returned {error}")]
    OAuth {
        error: String,
        description: Option<String>,
    },
    /// The callback URL lacks a required parameter.
    #[error("authorization callback is missing `{0}`")]
    MissingParameter(&'static str),
    /// An endpoint the operation needs is not configured.
    #[error("oauth endpoint not configured: {0}")]
    MissingEndpoint(&'static str),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Exchange(#[from] ProblemsError),
}

impl AuthError {
    /// Problem type this error surfaces as.
    pub fn problem_type(&self) -> ProblemType {
        match self {
            Self::MissingPendingLogin(_) | Self::StateMismatch => ProblemType::InvalidState,
            Self::NotAuthenticated => ProblemType::NotAuthenticated,
            Self::OAuth { .. } | Self::MissingParameter(_) => ProblemType::OAuthError,
            Self::MissingEndpoint(_) => ProblemType::InvalidRequest,
            Self::Storage(_) => ProblemType::Storage,
            Self::Exchange(problems) => problems
                .first_kind()
                .cloned()
                .unwrap_or(ProblemType::Generic),
        }
    }
}

impl From<AuthError> for ProblemsError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Exchange(problems) => problems,
            AuthError::Storage(err) => err.into(),
            AuthError::OAuth { error, description } => {
                let reason = description.clone().unwrap_or_else(|| error.clone());
                ProblemsError::single(
                    Problem::new(ProblemType::OAuthError)
                        .with_reason(reason)
                        .with_details(json!({
                            "error": error,
                            "error_description": description,
                        })),
                )
            }
            other => {
                ProblemsError::single(Problem::new(other.problem_type()).with_reason(other.to_string()))
            }
        }
    }
}

//! Structured problem descriptors exchanged with servers and shown to users.

use crate::path::normalize_path;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Problem classification carried in the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProblemType {
    /// Transport or network failure.
    Connection,
    /// A response body could not be decoded as requested.
    Unmarshaling,
    /// Non-2xx response with an unrecognized body shape.
    Generic,
    /// Validation error attributable to a form field.
    FieldError,
    /// Malformed value for a form field.
    InvalidFormat,
    /// OAuth callback state did not match a pending login.
    InvalidState,
    /// No usable credentials are available.
    NotAuthenticated,
    /// The authorization server reported an error.
    OAuthError,
    /// Persisting client-side state failed.
    Storage,
    /// A request could not be constructed (bad URL, header, or body).
    InvalidRequest,
    /// Any other server-declared type.
    Other(String),
}

impl ProblemType {
    /// Wire name of the type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connection => "CONNECTION_PROBLEM",
            Self::Unmarshaling => "UNMARSHALING_PROBLEM",
            Self::Generic => "GENERIC_PROBLEM",
            Self::FieldError => "FIELD_ERROR",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::InvalidState => "INVALID_STATE",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::OAuthError => "OAUTH_ERROR",
            Self::Storage => "STORAGE_PROBLEM",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::Other(name) => name,
        }
    }

    /// Whether problems of this type belong next to a specific form control.
    pub fn is_field_scoped(&self) -> bool {
        matches!(self, Self::FieldError | Self::InvalidFormat)
    }
}

impl From<String> for ProblemType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "CONNECTION_PROBLEM" => Self::Connection,
            "UNMARSHALING_PROBLEM" => Self::Unmarshaling,
            "GENERIC_PROBLEM" => Self::Generic,
            "FIELD_ERROR" => Self::FieldError,
            "INVALID_FORMAT" => Self::InvalidFormat,
            "INVALID_STATE" => Self::InvalidState,
            "NOT_AUTHENTICATED" => Self::NotAuthenticated,
            "OAUTH_ERROR" => Self::OAuthError,
            "STORAGE_PROBLEM" => Self::Storage,
            "INVALID_REQUEST" => Self::InvalidRequest,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for ProblemType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ProblemType> for String {
    fn from(value: ProblemType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structured error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Problem classification.
    #[serde(rename = "type")]
    pub kind: ProblemType,
    /// Dotted field path of the offending control, for field problems.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Arbitrary extra payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl Problem {
    /// Create a problem of the given type with no context, reason, or details.
    pub fn new(kind: impl Into<ProblemType>) -> Self {
        Self {
            kind: kind.into(),
            context: None,
            reason: None,
            details: None,
        }
    }

    /// Transport failure.
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::new(ProblemType::Connection).with_reason(reason)
    }

    /// Body decoding failure.
    pub fn unmarshaling(reason: impl Into<String>) -> Self {
        Self::new(ProblemType::Unmarshaling).with_reason(reason)
    }

    /// Fallback for error responses without a recognized problem payload.
    pub fn generic(status: u16, status_text: &str, body: impl Into<String>) -> Self {
        let reason = if status_text.is_empty() {
            status.to_string()
        } else {
            format!("{status} {status_text}")
        };
        let body = body.into();
        let problem = Self::new(ProblemType::Generic).with_reason(reason);
        if body.is_empty() {
            problem
        } else {
            problem.with_details(Value::String(body))
        }
    }

    /// Client-side request construction failure.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(ProblemType::InvalidRequest).with_reason(reason)
    }

    /// Field-scoped validation error.
    pub fn field(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ProblemType::FieldError)
            .with_context(context)
            .with_reason(reason)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Whether this problem should be rendered next to a form control.
    pub fn is_field_error(&self) -> bool {
        self.kind.is_field_scoped()
    }

    /// Context normalized to dotted form (`a[0].b` becomes `a.0.b`).
    pub fn field_path(&self) -> Option<String> {
        self.context
            .as_deref()
            .map(normalize_path)
            .filter(|path| !path.is_empty())
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(reason) = &self.reason {
            write!(f, ": {reason}")?;
        }
        if let Some(context) = &self.context {
            write!(f, " (context={context})")?;
        }
        Ok(())
    }
}

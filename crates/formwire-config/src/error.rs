//! Failures surfaced by [`FormwireConfig`](crate::FormwireConfig) loading.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer file exists but could not be read, or a runtime layer is missing.
    #[error("config file unreadable: {0}")]
    Unreadable(#[from] std::io::Error),
    #[error("config is not valid json5: {0}")]
    Json5(#[from] json5::Error),
    /// The merged document does not fit the `FormwireConfig` shape.
    #[error("config does not match the formwire schema: {0}")]
    Shape(#[from] serde_json::Error),
    /// `path` is `layer:dotted.key` for schema checks and the bare key otherwise.
    #[error("{path}: {message}")]
    Field { path: String, message: String },
}

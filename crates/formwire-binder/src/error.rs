//! Error types for the path binder.

use thiserror::Error;

/// Errors returned while building or reading value trees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The path contained no segments.
    #[error("empty field path")]
    EmptyPath,
    /// A segment addressed a node whose existing shape cannot hold it.
    #[error("conflicting container shape at `{segment}` in `{path}`")]
    ShapeConflict { path: String, segment: String },
    /// A sequence index exceeded the supported range.
    #[error("sequence index `{segment}` too large in `{path}`")]
    IndexTooLarge { path: String, segment: String },
    /// A control referenced an extractor that is not registered.
    #[error("unknown extractor: {0}")]
    UnknownExtractor(String),
    /// A control referenced a mutator that is not registered.
    #[error("unknown mutator: {0}")]
    UnknownMutator(String),
}

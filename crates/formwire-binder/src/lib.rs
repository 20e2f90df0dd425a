//! Binding between named form controls and nested JSON trees.
//!
//! Control names use a dotted path convention (`address.street`,
//! `items.0.sku`, `items[0].sku`). Extraction walks a form, applies the
//! per-control extraction policy and folds every value into a tree with
//! [`set_path`]. Population is the inverse and [`get_paths`] flattens a tree
//! back into dotted keys.

mod binder;
mod control;
mod error;
mod registry;
mod tree;

/// Form-level extraction, population, and problem placement.
pub use binder::{FormBinder, IgnorePredicate, default_extract, default_mutate, is_hidden};
/// Form control model.
pub use control::{Attributes, Control, ControlKind, Form, FormNode, Group, Inclusion, ValueType};
/// Binder error type.
pub use error::BindError;
/// Named extractor/mutator registry.
pub use registry::{Extractor, ExtractorRegistry, Mutator};
/// Path tree primitives.
pub use tree::{get_path, get_paths, set_path};

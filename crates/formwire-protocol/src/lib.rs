//! Shared wire types for formwire: structured problems and field paths.

mod error;
mod path;
mod problem;

pub use error::ProblemsError;
pub use path::{is_index_segment, normalize_path, split_path};
pub use problem::{Problem, ProblemType};

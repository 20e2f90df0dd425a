//! Dotted field-path helpers shared by the binder and problem placement.

use regex::Regex;
use std::sync::LazyLock;

static BRACKET_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("bracket index regex"));

/// Convert bracket notation to dotted form and collapse stray dots.
///
/// `items[0].name` and `items.0.name` both normalize to `items.0.name`.
pub fn normalize_path(path: &str) -> String {
    let dotted = BRACKET_INDEX.replace_all(path.trim(), ".$1.");
    split_path(&dotted).join(".")
}

/// Split a dotted path into its non-empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('.').filter(|segment| !segment.is_empty()).collect()
}

/// Whether a segment addresses a sequence index (`^[0-9]+$`).
pub fn is_index_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|byte| byte.is_ascii_digit())
}

//! Filesystem lookups used during layer discovery.

use crate::ConfigError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Absolute form of the starting directory. A directory that does not exist
/// yet is used as given so discovery simply finds nothing above it.
pub(super) fn resolve_start_dir(dir: &Path) -> Result<PathBuf, ConfigError> {
    dir.canonicalize().or_else(|err| match err.kind() {
        ErrorKind::NotFound => Ok(dir.to_path_buf()),
        _ => Err(ConfigError::Unreadable(err)),
    })
}

/// Key used to notice the same file reached through two layers.
pub(super) fn layer_identity(file: &Path) -> PathBuf {
    match file.canonicalize() {
        Ok(real) => real,
        Err(_) => file.to_path_buf(),
    }
}

/// Nearest directory at or above `start` holding one of `markers`.
pub(super) fn project_root(start: &Path, markers: &[String]) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        if markers.iter().any(|marker| current.join(marker).exists()) {
            return Some(current.to_path_buf());
        }
        dir = current.parent();
    }
    None
}

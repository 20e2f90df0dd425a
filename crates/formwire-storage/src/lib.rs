//! Prefix-namespaced JSON storage over pluggable string key/value backends.
//!
//! [`MemoryBackend`] lives for the process (session flavor);
//! [`FileBackend`] persists to a JSON file (local flavor).

mod backend;
mod error;
mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use error::StorageError;
pub use store::JsonStore;

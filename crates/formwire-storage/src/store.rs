//! Typed JSON values under a key prefix.

use crate::backend::StorageBackend;
use crate::error::StorageError;
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// JSON-serialized entries stored as `<prefix>.<key>`.
#[derive(Clone)]
pub struct JsonStore {
    prefix: String,
    backend: Arc<dyn StorageBackend>,
}

impl JsonStore {
    pub fn new(prefix: impl Into<String>, backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            prefix: prefix.into(),
            backend,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// A store nested under `<prefix>.<name>` sharing the same backend.
    pub fn scoped(&self, name: &str) -> Self {
        Self {
            prefix: self.full_key(name),
            backend: self.backend.clone(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.backend.get(&self.full_key(key))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let full_key = self.full_key(key);
        let encoded = serde_json::to_string(value)?;
        debug!("storing entry (key={}, len={})", full_key, encoded.len());
        self.backend.set(&full_key, encoded)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(&self.full_key(key))
    }

    /// Read and remove an entry.
    pub fn take<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let value = self.get(key)?;
        if value.is_some() {
            self.remove(key)?;
        }
        Ok(value)
    }

    /// Keys inside this namespace, without the prefix.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let namespace = self.full_key("");
        Ok(self
            .backend
            .keys()?
            .into_iter()
            .filter_map(|key| {
                if namespace.is_empty() {
                    Some(key)
                } else {
                    key.strip_prefix(&namespace).map(str::to_string)
                }
            })
            .collect())
    }

    /// Remove every entry in this namespace.
    pub fn clear(&self) -> Result<(), StorageError> {
        let keys = self.keys()?;
        for key in &keys {
            self.remove(key)?;
        }
        debug!("cleared namespace (prefix={}, removed={})", self.prefix, keys.len());
        Ok(())
    }
}

//! Configuration schema for formwire.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FormwireConfig {
    #[serde(default, rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<OAuthSettings>,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl FormwireConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> FormwireConfigBuilder {
        FormwireConfigBuilder::new()
    }
}

/// Builder for assembling a `FormwireConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct FormwireConfigBuilder {
    config: FormwireConfig,
}

impl FormwireConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn http(mut self, http: HttpConfig) -> Self {
        self.config.http = http;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.http.base_url = Some(base_url.into());
        self
    }

    pub fn oauth(mut self, oauth: OAuthSettings) -> Self {
        self.config.oauth = Some(oauth);
        self
    }

    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    pub fn build(self) -> FormwireConfig {
        self.config
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Base URL relative request paths resolve against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Whole-exchange timeout; `None` disables it.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,
    /// Headers added to requests that do not set them.
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,
    /// Log every exchange at info level.
    #[serde(default)]
    pub log_exchanges: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: None,
            default_headers: BTreeMap::new(),
            log_exchanges: false,
        }
    }
}

fn default_timeout_ms() -> Option<u64> {
    Some(30_000)
}

/// OAuth client registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthSettings {
    pub client_id: String,
    pub authorize_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logout_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_logout_redirect_uri: Option<String>,
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key prefix for every stored entry.
    #[serde(default = "default_storage_prefix")]
    pub prefix: String,
    /// File backing local storage; in-memory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefix: default_storage_prefix(),
            path: None,
        }
    }
}

fn default_storage_prefix() -> String {
    "formwire".to_string()
}

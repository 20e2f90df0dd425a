//! Loads `formwire.json5` from the user home, the enclosing project and any
//! runtime overrides, checking each layer on its own before the merge.

mod layer_io;
mod merge;
mod paths;
mod schema;

#[cfg(test)]
mod tests;

use crate::{ConfigError, FormwireConfig};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

const DEFAULT_CONFIG_FILE: &str = "formwire.json5";
/// Directory under `$HOME` holding the user layer.
const DEFAULT_CONFIG_DIR: &str = ".formwire";
const DEFAULT_PROJECT_ROOT_MARKERS: &[&str] = &[".git"];

/// Merged config together with the layers that fed it.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub config: FormwireConfig,
    /// Ordered from weakest to strongest.
    pub layers: Vec<ConfigLayer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// `~/.formwire/formwire.json5` or an explicit replacement.
    User,
    /// `formwire.json5` at the nearest project root.
    Project,
    /// Paths and values supplied by the caller.
    Runtime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    /// `None` for layers passed as values.
    pub path: Option<PathBuf>,
}

/// Where to look for layers and what to stack on top of them.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Start of the upward project root search.
    pub cwd: PathBuf,
    /// `None` disables the user layer.
    pub user_config_path: Option<PathBuf>,
    /// Must exist; a missing runtime file fails the load.
    pub runtime_paths: Vec<PathBuf>,
    pub runtime_values: Vec<Value>,
    /// Entries whose presence marks a project root, `.git` by default.
    pub project_root_markers: Vec<String>,
}

impl LayeredConfigOptions {
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
            runtime_values: Vec::new(),
            project_root_markers: DEFAULT_PROJECT_ROOT_MARKERS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    pub fn with_user_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.user_config_path = path;
        self
    }

    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_runtime_value(mut self, value: Value) -> Self {
        self.runtime_values.push(value);
        self
    }
}

impl FormwireConfig {
    /// Read one JSON5 file as a complete config.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("reading config file (path={})", path.display());
        Self::load_from_str(&fs::read_to_string(path)?)
    }

    /// Parse JSON5 text as a complete config.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("parsing config text (bytes={})", contents.len());
        config_from_value(json5::from_str(contents)?, "config")
    }

    /// Discover layers starting at `cwd` with the stock locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Later layers win: user, then project, then each runtime path in
    /// order, then each runtime value in order.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        info!(
            "discovering config layers (cwd={}, runtime_paths={}, runtime_values={})",
            options.cwd.display(),
            options.runtime_paths.len(),
            options.runtime_values.len()
        );
        let loaded = discover_layers(options)?;

        let mut merged = Value::Object(serde_json::Map::new());
        let layers = loaded
            .into_iter()
            .map(|layer| {
                merge::merge_json_values(&mut merged, &layer.value);
                layer.meta
            })
            .collect::<Vec<_>>();

        let config = config_from_value(merged, "effective")?;
        info!("config ready (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Range and URL checks the serde shape cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base_url) = &self.http.base_url {
            validate_url(base_url, "http.base_url")?;
        }
        if self.http.timeout_ms == Some(0) {
            return Err(invalid("http.timeout_ms", "must be greater than zero"));
        }
        if self.http.connect_timeout_ms == Some(0) {
            return Err(invalid("http.connect_timeout_ms", "must be greater than zero"));
        }
        if let Some(oauth) = &self.oauth {
            if oauth.client_id.trim().is_empty() {
                return Err(invalid("oauth.client_id", "must not be empty"));
            }
            validate_url(&oauth.authorize_url, "oauth.authorize_url")?;
            validate_url(&oauth.token_url, "oauth.token_url")?;
            if let Some(logout_url) = &oauth.logout_url {
                validate_url(logout_url, "oauth.logout_url")?;
            }
        }
        if self.storage.prefix.contains(char::is_whitespace) {
            return Err(invalid("storage.prefix", "must not contain whitespace"));
        }
        Ok(())
    }
}

/// Raw layer document, already checked against the schema.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

fn discover_layers(options: LayeredConfigOptions) -> Result<Vec<LoadedLayer>, ConfigError> {
    let start = paths::resolve_start_dir(&options.cwd)?;
    let mut found = Vec::new();
    let mut visited = HashSet::new();

    let user =
        layer_io::load_optional_layer(ConfigLayerSource::User, options.user_config_path.as_deref())?;
    if let Some(layer) = user {
        if let Some(file) = &layer.meta.path {
            visited.insert(paths::layer_identity(file));
        }
        found.push(layer);
    }

    if let Some(root) = paths::project_root(&start, &options.project_root_markers) {
        let file = root.join(DEFAULT_CONFIG_FILE);
        if !visited.insert(paths::layer_identity(&file)) {
            debug!("project layer is the user layer (path={})", file.display());
        } else if let Some(layer) =
            layer_io::load_optional_layer(ConfigLayerSource::Project, Some(&file))?
        {
            found.push(layer);
        }
    } else {
        debug!("no project root above {}", start.display());
    }

    for file in &options.runtime_paths {
        found.push(layer_io::load_required_layer(ConfigLayerSource::Runtime, file)?);
    }
    for value in options.runtime_values {
        found.push(layer_io::runtime_value_layer(value)?);
    }
    Ok(found)
}

fn config_from_value(value: Value, label: &str) -> Result<FormwireConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: FormwireConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}

fn validate_url(raw: &str, path: &str) -> Result<(), ConfigError> {
    Url::parse(raw)
        .map(|_| ())
        .map_err(|err| invalid(path, &format!("invalid url: {err}")))
}

fn invalid(path: &str, message: &str) -> ConfigError {
    ConfigError::Field {
        path: path.to_string(),
        message: message.to_string(),
    }
}

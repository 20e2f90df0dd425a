//! Tests for layered configuration loading.

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write JSON5 contents to a path, creating parent directories if needed.
fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// A project with a `.git` marker and a nested working directory.
fn project(root: &Path) -> (PathBuf, PathBuf) {
    let project_root = root.join("project");
    fs::create_dir_all(project_root.join(".git")).expect("git");
    let cwd = project_root.join("src");
    fs::create_dir_all(&cwd).expect("cwd");
    (project_root, cwd)
}

#[test]
fn parse_minimal_config() {
    let config = FormwireConfig::load_from_str("{}").expect("config");
    assert_eq!(config.http.timeout_ms, Some(30_000));
    assert_eq!(config.storage.prefix, "formwire");
    assert_eq!(config.oauth, None);
}

#[test]
fn parse_full_config() {
    let json5 = r#"{
        // comments are allowed
        http: {
            base_url: "https://api.example.com/v1",
            timeout_ms: null,
            default_headers: { "x-client": "web" },
        },
        oauth: {
            client_id: "web",
            authorize_url: "https://auth.example.com/authorize",
            token_url: "https://auth.example.com/token",
            redirect_uri: "https://app.example.com/callback",
            scopes: ["openid"],
        },
        storage: { prefix: "app", path: "/tmp/app.json" },
    }"#;
    let config = FormwireConfig::load_from_str(json5).expect("config");
    assert_eq!(config.http.timeout_ms, None);
    assert_eq!(config.http.default_headers["x-client"], "web");
    assert_eq!(config.oauth.expect("oauth").scopes, vec!["openid".to_string()]);
    assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/app.json")));
}

#[test]
fn rejects_unknown_top_level_key() {
    let err = FormwireConfig::load_from_str("{ unexpected: true }").unwrap_err();
    assert!(format!("{err}").contains("unknown key"));
}

#[test]
fn schema_errors_name_the_field() {
    let err = FormwireConfig::load_from_str(r#"{ http: { timeout_ms: "soon" } }"#).unwrap_err();
    match err {
        ConfigError::Field { path, message } => {
            assert_eq!(path, "config:http.timeout_ms");
            assert_eq!(message, "expected non-negative integer");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejects_invalid_urls() {
    let err = FormwireConfig::load_from_str(r#"{ http: { base_url: "not a url" } }"#).unwrap_err();
    assert!(format!("{err}").contains("http.base_url"));
}

#[test]
fn oauth_requires_all_endpoints_after_merge() {
    let err = FormwireConfig::load_from_str(r#"{ oauth: { client_id: "web" } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Shape(_)));
}

#[test]
fn runtime_overrides_project_which_overrides_user() {
    let temp = TempDir::new().expect("tmp");
    let (project_root, cwd) = project(temp.path());

    let user_config = temp.path().join("user.json5");
    write_json5(
        &user_config,
        r#"{ http: { base_url: "https://user.test", default_headers: { "x-user": "1" } },
             storage: { prefix: "user" } }"#,
    );
    write_json5(
        &project_root.join(DEFAULT_CONFIG_FILE),
        r#"{ http: { base_url: "https://project.test" }, storage: { prefix: "project" } }"#,
    );
    let runtime_config = temp.path().join("runtime.json5");
    write_json5(&runtime_config, r#"{ http: { base_url: "https://runtime.test" } }"#);

    let options = LayeredConfigOptions::new(&cwd)
        .with_user_config_path(Some(user_config.clone()))
        .with_runtime_path(&runtime_config);
    let layered = FormwireConfig::load_layered_with_options(options).expect("config");

    assert_eq!(
        layered.config.http.base_url.as_deref(),
        Some("https://runtime.test")
    );
    assert_eq!(layered.config.storage.prefix, "project");
    assert_eq!(layered.config.http.default_headers["x-user"], "1");
    let sources: Vec<_> = layered.layers.iter().map(|layer| layer.source).collect();
    assert_eq!(
        sources,
        vec![
            ConfigLayerSource::User,
            ConfigLayerSource::Project,
            ConfigLayerSource::Runtime
        ]
    );
}

#[test]
fn runtime_values_apply_last() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project(temp.path());
    let runtime_config = temp.path().join("runtime.json5");
    write_json5(&runtime_config, r#"{ storage: { prefix: "file" } }"#);

    let options = LayeredConfigOptions::new(&cwd)
        .with_user_config_path(None)
        .with_runtime_path(&runtime_config)
        .with_runtime_value(json!({"storage": {"prefix": "memory"}}));
    let layered = FormwireConfig::load_layered_with_options(options).expect("config");

    assert_eq!(layered.config.storage.prefix, "memory");
    assert_eq!(layered.layers.last().and_then(|layer| layer.path.clone()), None);
}

#[test]
fn missing_layers_are_skipped() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project(temp.path());
    let options = LayeredConfigOptions::new(&cwd)
        .with_user_config_path(Some(temp.path().join("absent.json5")));
    let layered = FormwireConfig::load_layered_with_options(options).expect("config");
    assert!(layered.layers.is_empty());
    assert_eq!(layered.config, FormwireConfig::default());
}

#[test]
fn invalid_layer_reports_its_origin() {
    let temp = TempDir::new().expect("tmp");
    let (project_root, cwd) = project(temp.path());
    write_json5(
        &project_root.join(DEFAULT_CONFIG_FILE),
        r#"{ oauth: { scopes: "openid" } }"#,
    );
    let options = LayeredConfigOptions::new(&cwd).with_user_config_path(None);
    let err = FormwireConfig::load_layered_with_options(options).unwrap_err();
    match err {
        ConfigError::Field { path, .. } => {
            assert!(path.starts_with("project("));
            assert!(path.ends_with(":oauth.scopes"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_runtime_path_is_an_error() {
    let temp = TempDir::new().expect("tmp");
    let options = LayeredConfigOptions::new(temp.path())
        .with_user_config_path(None)
        .with_runtime_path(temp.path().join("missing.json5"));
    let err = FormwireConfig::load_layered_with_options(options).unwrap_err();
    assert!(matches!(err, ConfigError::Unreadable(_)));
}

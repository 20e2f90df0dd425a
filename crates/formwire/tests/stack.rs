use formwire::binder::{Control, Form};
use formwire::config::{FormwireConfig, HttpConfig, OAuthSettings, StorageConfig};
use formwire::http::Method;
use formwire::protocol::{Problem, ProblemType};
use formwire::{Formwire, FormwireError};
use formwire_test_utils::{
    CallLog, MockTransport, RecordingInterceptor, init_logging, problems_response, text_response,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;

fn oauth_settings() -> OAuthSettings {
    OAuthSettings {
        client_id: "web".into(),
        authorize_url: "https://auth.test/authorize".into(),
        token_url: "https://auth.test/token".into(),
        redirect_uri: "https://app.test/callback".into(),
        scopes: vec!["openid".into()],
        logout_url: None,
        post_logout_redirect_uri: None,
    }
}

fn config() -> FormwireConfig {
    FormwireConfig::builder()
        .base_url("https://api.test/v1")
        .build()
}

fn stack(config: FormwireConfig, transport: &MockTransport) -> Formwire {
    Formwire::builder(config)
        .with_transport(Arc::new(transport.clone()))
        .build()
        .expect("stack")
}

fn signup_form() -> Form {
    Form::new()
        .child(Control::text("user.name", "Ada"))
        .child(Control::text("user.email", "ada@example.com"))
        .child(Control::checkbox("terms", true))
}

fn body_json(transport: &MockTransport) -> Value {
    let request = transport.last_request().expect("request");
    serde_json::from_slice(request.body.as_deref().unwrap_or_default()).expect("json body")
}

#[test]
fn chain_order_follows_config() {
    let mut headers = BTreeMap::new();
    headers.insert("x-client".to_string(), "web".to_string());
    let config = FormwireConfig::builder()
        .http(HttpConfig {
            log_exchanges: true,
            default_headers: headers,
            ..HttpConfig::default()
        })
        .oauth(oauth_settings())
        .build();

    let transport = MockTransport::new();
    let recorder = RecordingInterceptor::new("custom", CallLog::default());
    let formwire = Formwire::builder(config)
        .with_transport(Arc::new(transport))
        .with_interceptor(Arc::new(recorder))
        .build()
        .expect("stack");

    assert_eq!(
        formwire.http().chain().names(),
        vec!["logging", "timeout", "default-headers", "bearer", "custom"]
    );
    assert!(formwire.oauth().is_some());
}

#[tokio::test]
async fn submit_sends_extracted_form() {
    init_logging();
    let transport = MockTransport::new().respond_json(201, json!({"id": 7}));
    let formwire = stack(config(), &transport);
    let mut form = signup_form();

    let created = formwire
        .submit(&mut form, Method::POST, "/users")
        .await
        .expect("created");

    assert_eq!(created, json!({"id": 7}));
    let request = transport.last_request().expect("request");
    assert_eq!(request.url.as_str(), "https://api.test/v1/users");
    assert_eq!(
        body_json(&transport),
        json!({"user": {"name": "Ada", "email": "ada@example.com"}, "terms": true})
    );
}

#[tokio::test]
async fn rejected_submit_places_field_problems() {
    let transport = MockTransport::new().respond(problems_response(
        400,
        &[
            Problem::field("user.email", "already registered"),
            Problem::new("QUOTA_EXCEEDED").with_reason("too many signups"),
        ],
    ));
    let formwire = stack(config(), &transport);
    let mut form = signup_form();

    let err = formwire
        .submit(&mut form, Method::POST, "users")
        .await
        .unwrap_err();

    let (problems, unplaced) = match err {
        FormwireError::Rejected { problems, unplaced } => (problems, unplaced),
        other => panic!("expected rejection, got {other}"),
    };
    assert_eq!(problems.problems.len(), 2);
    assert_eq!(unplaced.len(), 1);
    assert_eq!(unplaced[0].kind, ProblemType::from("QUOTA_EXCEEDED"));

    let email = form.control("user.email").expect("control");
    assert_eq!(email.problems.len(), 1);
    assert_eq!(email.problems[0].reason.as_deref(), Some("already registered"));
    assert!(form.control("user.name").expect("control").problems.is_empty());
}

#[tokio::test]
async fn successful_submit_clears_previous_problems() {
    let transport = MockTransport::new()
        .respond(problems_response(400, &[Problem::field("user.name", "required")]))
        .respond(text_response(204, ""));
    let formwire = stack(config(), &transport);
    let mut form = signup_form();

    assert!(formwire.submit(&mut form, Method::PUT, "users/1").await.is_err());
    assert_eq!(form.control("user.name").expect("control").problems.len(), 1);

    let result = formwire
        .submit(&mut form, Method::PUT, "users/1")
        .await
        .expect("ok");
    assert_eq!(result, Value::Null);
    assert!(form.control("user.name").expect("control").problems.is_empty());
}

#[tokio::test]
async fn connection_failures_are_not_rejections() {
    let transport = MockTransport::new().fail_connection("refused");
    let formwire = stack(config(), &transport);
    let mut form = signup_form();

    let err = formwire
        .submit(&mut form, Method::POST, "users")
        .await
        .unwrap_err();
    match err {
        FormwireError::Exchange(problems) => {
            assert_eq!(problems.first_kind(), Some(&ProblemType::Connection));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn default_headers_reach_the_transport() {
    let mut headers = BTreeMap::new();
    headers.insert("x-client".to_string(), "web".to_string());
    let config = FormwireConfig::builder()
        .http(HttpConfig {
            base_url: Some("https://api.test/".into()),
            default_headers: headers,
            ..HttpConfig::default()
        })
        .build();
    let transport = MockTransport::new();
    let formwire = stack(config, &transport);

    formwire.http().get("ping").send().await.expect("response");
    let request = transport.last_request().expect("request");
    assert_eq!(
        request.headers.get("x-client").and_then(|v| v.to_str().ok()),
        Some("web")
    );
}

#[test]
fn invalid_header_is_reported_with_its_path() {
    let mut headers = BTreeMap::new();
    headers.insert("bad header".to_string(), "v".to_string());
    let config = FormwireConfig::builder()
        .http(HttpConfig {
            default_headers: headers,
            ..HttpConfig::default()
        })
        .build();

    let err = Formwire::builder(config)
        .with_transport(Arc::new(MockTransport::new()))
        .build()
        .err()
        .expect("error");
    match err {
        FormwireError::InvalidSetting { path, .. } => {
            assert_eq!(path, "http.default_headers.bad header");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn oauth_login_state_lives_in_session_store() {
    let config = FormwireConfig::builder().oauth(oauth_settings()).build();
    let formwire = stack(config, &MockTransport::new());

    let authorize = formwire
        .oauth()
        .expect("oauth")
        .begin_login()
        .expect("login");
    assert_eq!(authorize.host_str(), Some("auth.test"));
    assert_eq!(
        formwire.session_store().keys().expect("keys"),
        vec!["pkce.web".to_string()]
    );
    assert_eq!(formwire.session_store().prefix(), "formwire");
}

#[test]
fn local_store_persists_to_configured_file() {
    let temp = TempDir::new().expect("tmp");
    let config = FormwireConfig::builder()
        .storage(StorageConfig {
            prefix: "app".into(),
            path: Some(temp.path().join("state.json")),
        })
        .build();

    let first = stack(config.clone(), &MockTransport::new());
    first
        .local_store()
        .set("draft", &json!({"title": "hello"}))
        .expect("set");

    let second = stack(config, &MockTransport::new());
    let draft: Option<Value> = second.local_store().get("draft").expect("get");
    assert_eq!(draft, Some(json!({"title": "hello"})));
}

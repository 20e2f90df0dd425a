use chrono::{Duration, Utc};
use formwire_auth::pkce::challenge_s256;
use formwire_auth::{AuthError, BearerInterceptor, OAuthClient, OAuthConfig, TokenSet};
use formwire_http::{HttpClient, HttpRequest, InterceptorChain};
use formwire_protocol::{ProblemType, ProblemsError};
use formwire_storage::{JsonStore, MemoryBackend};
use formwire_test_utils::{MockTransport, json_response};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

struct Harness {
    client: Arc<OAuthClient>,
    transport: MockTransport,
    session_store: JsonStore,
    token_store: JsonStore,
}

fn url(raw: &str) -> Url {
    Url::parse(raw).expect("url")
}

fn harness(transport: MockTransport) -> Harness {
    let config = OAuthConfig::new(
        "web",
        url("https://auth.test/authorize"),
        url("https://auth.test/token"),
        "https://app.test/callback",
    )
    .with_scopes(["openid", "profile"])
    .with_logout(
        url("https://auth.test/logout"),
        Some("https://app.test/".to_string()),
    );
    let http = HttpClient::new(InterceptorChain::new(Arc::new(transport.clone())));
    let session_store = JsonStore::new("session", Arc::new(MemoryBackend::new()));
    let token_store = JsonStore::new("local", Arc::new(MemoryBackend::new()));
    let client = OAuthClient::new(config, http, session_store.clone(), token_store.clone());
    Harness {
        client: Arc::new(client),
        transport,
        session_store,
        token_store,
    }
}

fn query_map(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

fn form_map(request: &HttpRequest) -> HashMap<String, String> {
    let body = request.body.clone().unwrap_or_default();
    url::form_urlencoded::parse(&body).into_owned().collect()
}

fn problem_kind(err: AuthError) -> Option<ProblemType> {
    ProblemsError::from(err).first_kind().cloned()
}

fn token_body() -> Value {
    json!({
        "access_token": "access-1",
        "token_type": "Bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-1",
        "id_token": "id-1"
    })
}

fn expired_tokens() -> TokenSet {
    TokenSet {
        access_token: "stale".into(),
        token_type: "Bearer".into(),
        refresh_token: Some("refresh-1".into()),
        id_token: None,
        expires_at: Some(Utc::now() - Duration::minutes(5)),
        scope: None,
    }
}

#[test]
fn begin_login_builds_authorize_url_and_stores_verifier() {
    let h = harness(MockTransport::new());
    let authorize = h.client.begin_login().expect("login");

    assert_eq!(authorize.path(), "/authorize");
    let query = query_map(&authorize);
    assert_eq!(query["response_type"], "code");
    assert_eq!(query["client_id"], "web");
    assert_eq!(query["redirect_uri"], "https://app.test/callback");
    assert_eq!(query["scope"], "openid profile");
    assert_eq!(query["code_challenge_method"], "S256");

    let pending: Value = h
        .session_store
        .get("pkce.web")
        .expect("read")
        .expect("pending login");
    let verifier = pending["verifier"].as_str().expect("verifier");
    assert_eq!(verifier.len(), 64);
    assert_eq!(query["code_challenge"], challenge_s256(verifier));
    assert_eq!(pending["state"], json!(query["state"]));
}

#[tokio::test]
async fn complete_login_exchanges_code_for_tokens() {
    let h = harness(MockTransport::new().respond_json(200, token_body()));
    let authorize = h.client.begin_login().expect("login");
    let state = query_map(&authorize)["state"].clone();
    let pending: Value = h.session_store.get("pkce.web").expect("read").expect("pending");

    let tokens = h.client.complete_login("code-1", &state).await.expect("tokens");

    assert_eq!(tokens.access_token, "access-1");
    assert_eq!(tokens.refresh_token.as_deref(), Some("refresh-1"));
    assert!(tokens.expires_at.is_some());

    let request = h.transport.last_request().expect("token request");
    assert_eq!(request.url.as_str(), "https://auth.test/token");
    let form = form_map(&request);
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["code"], "code-1");
    assert_eq!(form["client_id"], "web");
    assert_eq!(form["redirect_uri"], "https://app.test/callback");
    assert_eq!(json!(form["code_verifier"]), pending["verifier"]);

    let stored: Option<TokenSet> = h.token_store.get("tokens.web").expect("read");
    assert_eq!(stored, Some(tokens));
    assert!(h.session_store.keys().expect("keys").is_empty());
}

#[tokio::test]
async fn complete_from_callback_parses_redirect() {
    let h = harness(MockTransport::new().respond_json(200, token_body()));
    let authorize = h.client.begin_login().expect("login");
    let state = query_map(&authorize)["state"].clone();
    let mut callback = url("https://app.test/callback");
    callback
        .query_pairs_mut()
        .append_pair("code", "code-9")
        .append_pair("state", &state);

    h.client
        .complete_from_callback(&callback)
        .await
        .expect("tokens");
    assert_eq!(form_map(&h.transport.requests()[0])["code"], "code-9");
    assert!(h.client.session().is_authenticated());
}

#[tokio::test]
async fn state_mismatch_is_invalid_state() {
    let h = harness(MockTransport::new());
    h.client.begin_login().expect("login");

    let err = h.client.complete_login("code-1", "forged").await.unwrap_err();
    assert_eq!(problem_kind(err), Some(ProblemType::InvalidState));
    assert!(h.transport.requests().is_empty());
    assert!(h.session_store.keys().expect("keys").is_empty());
}

#[tokio::test]
async fn completing_without_pending_login_is_invalid_state() {
    let h = harness(MockTransport::new());
    let err = h.client.complete_login("code-1", "state").await.unwrap_err();
    assert_eq!(problem_kind(err), Some(ProblemType::InvalidState));
}

#[tokio::test]
async fn token_endpoint_problem_propagates() {
    let h = harness(MockTransport::new().respond(json_response(
        400,
        "application/problem+json",
        &json!({"type": "OAUTH_ERROR", "reason": "invalid_grant"}),
    )));
    let authorize = h.client.begin_login().expect("login");
    let state = query_map(&authorize)["state"].clone();

    let err = h.client.complete_login("code-1", &state).await.unwrap_err();
    assert_eq!(problem_kind(err), Some(ProblemType::OAuthError));
    assert!(!h.client.session().is_authenticated());
}

async fn login_with_token_body(body: Value) -> (Harness, Result<TokenSet, AuthError>) {
    let h = harness(MockTransport::new().respond_json(200, body));
    let authorize = h.client.begin_login().expect("login");
    let state = query_map(&authorize)["state"].clone();
    let result = h.client.complete_login("code-1", &state).await;
    (h, result)
}

#[tokio::test]
async fn out_of_range_expires_in_yields_non_expiring_tokens() {
    let (h, result) =
        login_with_token_body(json!({"access_token": "a", "expires_in": 9_000_000_000_000i64}))
            .await;

    let tokens = result.expect("tokens");
    assert_eq!(tokens.expires_at, None);
    assert!(!tokens.is_expired());
    assert!(h.client.session().is_authenticated());
}

#[tokio::test]
async fn negative_expires_in_yields_expired_tokens() {
    let (_h, result) =
        login_with_token_body(json!({"access_token": "a", "expires_in": -30})).await;

    let tokens = result.expect("tokens");
    assert!(tokens.expires_at.is_some());
    assert!(tokens.is_expired());
}

#[tokio::test]
async fn token_body_without_access_token_is_unmarshaling_problem() {
    let (h, result) = login_with_token_body(json!({"token_type": "Bearer"})).await;

    let err = result.unwrap_err();
    assert!(matches!(err, AuthError::Exchange(_)));
    assert_eq!(problem_kind(err), Some(ProblemType::Unmarshaling));
    assert!(!h.client.session().is_authenticated());
}

#[tokio::test]
async fn refresh_without_refresh_token_is_not_authenticated() {
    let h = harness(MockTransport::new());
    let err = h.client.refresh().await.unwrap_err();
    assert_eq!(problem_kind(err), Some(ProblemType::NotAuthenticated));

    let mut tokens = expired_tokens();
    tokens.refresh_token = None;
    h.client.session().store(tokens).expect("store");
    let err = h.client.refresh().await.unwrap_err();
    assert_eq!(problem_kind(err), Some(ProblemType::NotAuthenticated));
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn refresh_replaces_access_token_and_keeps_refresh_token() {
    let h = harness(
        MockTransport::new().respond_json(200, json!({"access_token": "access-2", "expires_in": 60})),
    );
    h.client.session().store(expired_tokens()).expect("store");

    let tokens = h.client.refresh().await.expect("refresh");
    assert_eq!(tokens.access_token, "access-2");
    assert_eq!(tokens.refresh_token.as_deref(), Some("refresh-1"));

    let form = form_map(&h.transport.last_request().expect("request"));
    assert_eq!(form["grant_type"], "refresh_token");
    assert_eq!(form["refresh_token"], "refresh-1");
    assert_eq!(h.client.session().access_token().as_deref(), Some("access-2"));
}

#[tokio::test]
async fn logout_url_carries_id_token_hint_and_clears_tokens() {
    let h = harness(MockTransport::new().respond_json(200, token_body()));
    let authorize = h.client.begin_login().expect("login");
    let state = query_map(&authorize)["state"].clone();
    h.client.complete_login("code-1", &state).await.expect("tokens");

    let logout = h.client.logout_url().expect("logout");
    let query = query_map(&logout);
    assert_eq!(logout.path(), "/logout");
    assert_eq!(query["client_id"], "web");
    assert_eq!(query["post_logout_redirect_uri"], "https://app.test/");
    assert_eq!(query["id_token_hint"], "id-1");
    assert!(!h.client.session().is_authenticated());
    assert!(h.token_store.keys().expect("keys").is_empty());
}

#[tokio::test]
async fn bearer_interceptor_attaches_access_token() {
    let h = harness(MockTransport::new().respond_json(200, token_body()));
    let authorize = h.client.begin_login().expect("login");
    let state = query_map(&authorize)["state"].clone();
    h.client.complete_login("code-1", &state).await.expect("tokens");

    let api_transport = MockTransport::new();
    let api = HttpClient::new(
        InterceptorChain::new(Arc::new(api_transport.clone()))
            .with(Arc::new(BearerInterceptor::new(h.client.clone()))),
    )
    .with_base_url(url("https://api.test/"));
    api.get("me").send().await.expect("response");

    let request = api_transport.last_request().expect("request");
    assert_eq!(
        request
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok()),
        Some("Bearer access-1")
    );
}

#[tokio::test]
async fn bearer_interceptor_refreshes_expired_token() {
    let h = harness(
        MockTransport::new().respond_json(200, json!({"access_token": "fresh", "expires_in": 600})),
    );
    h.client.session().store(expired_tokens()).expect("store");

    let api_transport = MockTransport::new();
    let api = HttpClient::new(
        InterceptorChain::new(Arc::new(api_transport.clone()))
            .with(Arc::new(BearerInterceptor::new(h.client.clone()))),
    )
    .with_base_url(url("https://api.test/"));
    api.get("me").send().await.expect("response");

    assert_eq!(h.transport.requests().len(), 1);
    let request = api_transport.last_request().expect("request");
    assert_eq!(
        request
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok()),
        Some("Bearer fresh")
    );
}

#[tokio::test]
async fn bearer_interceptor_sends_anonymously_without_tokens() {
    let h = harness(MockTransport::new());
    let api_transport = MockTransport::new();
    let api = HttpClient::new(
        InterceptorChain::new(Arc::new(api_transport.clone()))
            .with(Arc::new(BearerInterceptor::new(h.client.clone()))),
    )
    .with_base_url(url("https://api.test/"));
    api.get("public").send().await.expect("response");

    let request = api_transport.last_request().expect("request");
    assert!(!request.headers.contains_key("authorization"));
}

//! Authorization Code + PKCE login, refresh and logout.

use crate::config::OAuthConfig;
use crate::error::AuthError;
use crate::pkce::{PkceChallenge, generate_state};
use crate::session::TokenSession;
use crate::tokens::{TokenResponse, TokenSet};
use chrono::Utc;
use formwire_http::HttpClient;
use formwire_storage::JsonStore;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use url::Url;

/// Login started by [`OAuthClient::begin_login`], awaiting its callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PendingLogin {
    state: String,
    verifier: String,
    redirect_uri: String,
}

/// Parameters delivered to the redirect URI after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCallback {
    pub code: String,
    pub state: String,
}

/// Extract `code` and `state` from a redirect URI.
///
/// An `error` parameter takes precedence and is reported with its
/// `error_description`.
pub fn parse_callback(url: &Url) -> Result<AuthorizationCallback, AuthError> {
    let mut code = None;
    let mut state = None;
    let mut error = None;
    let mut description = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => description = Some(value.into_owned()),
            _ => {}
        }
    }
    if let Some(error) = error {
        return Err(AuthError::OAuth { error, description });
    }
    Ok(AuthorizationCallback {
        code: code.ok_or(AuthError::MissingParameter("code"))?,
        state: state.ok_or(AuthError::MissingParameter("state"))?,
    })
}

/// OAuth client for one registered application.
///
/// Token endpoint calls go through `http`, which must not carry a
/// [`BearerInterceptor`](crate::BearerInterceptor) for this client.
pub struct OAuthClient {
    config: OAuthConfig,
    http: HttpClient,
    pending: JsonStore,
    session: TokenSession,
}

impl OAuthClient {
    /// `session_store` keeps the pending login; `token_store` keeps tokens.
    pub fn new(
        config: OAuthConfig,
        http: HttpClient,
        session_store: JsonStore,
        token_store: JsonStore,
    ) -> Self {
        let session = TokenSession::new(token_store, &config.client_id);
        Self {
            config,
            http,
            pending: session_store,
            session,
        }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    pub fn session(&self) -> &TokenSession {
        &self.session
    }

    fn pending_key(&self) -> String {
        format!("pkce.{}", self.config.client_id)
    }

    /// Start a login and return the authorize URL to navigate to.
    pub fn begin_login(&self) -> Result<Url, AuthError> {
        let pkce = PkceChallenge::generate();
        let state = generate_state();
        self.pending.set(
            &self.pending_key(),
            &PendingLogin {
                state: state.clone(),
                verifier: pkce.verifier.clone(),
                redirect_uri: self.config.redirect_uri.clone(),
            },
        )?;

        let mut url = self.config.authorize_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.config.client_id)
                .append_pair("redirect_uri", &self.config.redirect_uri);
            if !self.config.scopes.is_empty() {
                query.append_pair("scope", &self.config.scope());
            }
            query
                .append_pair("state", &state)
                .append_pair("code_challenge", &pkce.challenge)
                .append_pair("code_challenge_method", pkce.method());
        }
        debug!(
            "login started (client_id={}, authorize_url={})",
            self.config.client_id, self.config.authorize_url
        );
        Ok(url)
    }

    /// Exchange an authorization code for tokens.
    ///
    /// The pending login is consumed whether or not the exchange succeeds.
    pub async fn complete_login(&self, code: &str, state: &str) -> Result<TokenSet, AuthError> {
        let pending: PendingLogin = self
            .pending
            .take(&self.pending_key())?
            .ok_or_else(|| AuthError::MissingPendingLogin(self.config.client_id.clone()))?;
        if pending.state != state {
            return Err(AuthError::StateMismatch);
        }

        let response: TokenResponse = self
            .http
            .post(self.config.token_url.as_str())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", pending.redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("code_verifier", pending.verifier.as_str()),
            ])
            .send_json()
            .await?;
        let tokens = TokenSet::from_response(response, Utc::now());
        self.session.store(tokens.clone())?;
        info!("login completed (client_id={})", self.config.client_id);
        Ok(tokens)
    }

    /// Parse a redirect URI and complete the login it belongs to.
    pub async fn complete_from_callback(&self, url: &Url) -> Result<TokenSet, AuthError> {
        let callback = parse_callback(url)?;
        self.complete_login(&callback.code, &callback.state).await
    }

    /// Trade the stored refresh token for a new token set.
    pub async fn refresh(&self) -> Result<TokenSet, AuthError> {
        let current = self.session.tokens().ok_or(AuthError::NotAuthenticated)?;
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NotAuthenticated)?;

        let response: TokenResponse = self
            .http
            .post(self.config.token_url.as_str())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.config.client_id.as_str()),
            ])
            .send_json()
            .await?;
        let tokens = TokenSet::from_response(response, Utc::now()).inherit(&current);
        self.session.store(tokens.clone())?;
        debug!("tokens refreshed (client_id={})", self.config.client_id);
        Ok(tokens)
    }

    /// Build the end-session URL and forget the stored tokens.
    pub fn logout_url(&self) -> Result<Url, AuthError> {
        let mut url = self
            .config
            .logout_url
            .clone()
            .ok_or(AuthError::MissingEndpoint("logout_url"))?;
        let id_token = self.session.tokens().and_then(|tokens| tokens.id_token);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.config.client_id);
            if let Some(redirect) = &self.config.post_logout_redirect_uri {
                query.append_pair("post_logout_redirect_uri", redirect);
            }
            if let Some(id_token) = &id_token {
                query.append_pair("id_token_hint", id_token);
            }
        }
        self.session.clear()?;
        info!("logged out (client_id={})", self.config.client_id);
        Ok(url)
    }

    /// Whether a token endpoint request targets `url`.
    pub(crate) fn is_token_endpoint(&self, url: &Url) -> bool {
        url.scheme() == self.config.token_url.scheme()
            && url.host_str() == self.config.token_url.host_str()
            && url.port_or_known_default() == self.config.token_url.port_or_known_default()
            && url.path() == self.config.token_url.path()
    }
}

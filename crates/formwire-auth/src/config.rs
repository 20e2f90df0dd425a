use serde::{Deserialize, Serialize};
use url::Url;

/// Authorization server endpoints and client registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub authorize_url: Url,
    pub token_url: Url,
    pub redirect_uri: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logout_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_logout_redirect_uri: Option<String>,
}

impl OAuthConfig {
    pub fn new(
        client_id: impl Into<String>,
        authorize_url: Url,
        token_url: Url,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            authorize_url,
            token_url,
            redirect_uri: redirect_uri.into(),
            scopes: Vec::new(),
            logout_url: None,
            post_logout_redirect_uri: None,
        }
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_logout(mut self, logout_url: Url, post_logout_redirect_uri: Option<String>) -> Self {
        self.logout_url = Some(logout_url);
        self.post_logout_redirect_uri = post_logout_redirect_uri;
        self
    }

    /// Space-separated scope parameter.
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }
}

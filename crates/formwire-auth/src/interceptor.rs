//! Bearer token attachment for outgoing requests.

use crate::client::OAuthClient;
use async_trait::async_trait;
use formwire_http::header::AUTHORIZATION;
use formwire_http::{HeaderValue, HttpRequest, Interceptor};
use formwire_protocol::{Problem, ProblemsError};
use log::debug;
use std::sync::Arc;

/// Attaches the session's access token, refreshing it first when expired.
///
/// Requests that already carry an `Authorization` header, and requests to
/// the token endpoint, pass through untouched. Without tokens the request is
/// sent anonymously.
pub struct BearerInterceptor {
    client: Arc<OAuthClient>,
}

impl BearerInterceptor {
    pub fn new(client: Arc<OAuthClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Interceptor for BearerInterceptor {
    fn name(&self) -> &str {
        "bearer"
    }

    async fn before(&self, request: &mut HttpRequest) -> Result<(), ProblemsError> {
        if request.headers.contains_key(AUTHORIZATION)
            || self.client.is_token_endpoint(&request.url)
        {
            return Ok(());
        }
        let Some(mut tokens) = self.client.session().tokens() else {
            debug!("no tokens, sending anonymously (url={})", request.url);
            return Ok(());
        };
        if tokens.is_expired() {
            debug!("access token expired, refreshing (url={})", request.url);
            tokens = self.client.refresh().await?;
        }
        let value = HeaderValue::from_str(&tokens.authorization())
            .map_err(|err| Problem::invalid_request(format!("invalid access token: {err}")))?;
        request.headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

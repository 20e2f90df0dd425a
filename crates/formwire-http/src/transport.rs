//! Terminal step of the chain: the network call.

use crate::message::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use formwire_protocol::ProblemsError;
use log::debug;
use std::time::Duration;

/// Performs the actual network exchange.
///
/// Implementations translate transport failures into a `CONNECTION_PROBLEM`.
/// Non-2xx responses are returned as responses, not errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ProblemsError>;
}

/// Transport backed by a `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client with a connect timeout.
    pub fn with_connect_timeout(timeout: Duration) -> Result<Self, ProblemsError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|err| ProblemsError::connection(err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ProblemsError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(connection_problem)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(connection_problem)?;
        debug!(
            "transport completed (status={}, body_len={})",
            status.as_u16(),
            body.len()
        );
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn connection_problem(err: reqwest::Error) -> ProblemsError {
    let reason = if err.is_connect() {
        format!("failed to connect: {err}")
    } else if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    };
    ProblemsError::connection(reason)
}

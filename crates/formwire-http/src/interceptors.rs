//! Built-in interceptors.

use crate::chain::{Interceptor, Next};
use crate::message::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use formwire_protocol::ProblemsError;
use log::{debug, info};
use reqwest::header::HeaderMap;
use std::time::Duration;

/// Adds headers the request does not already carry.
#[derive(Debug, Clone, Default)]
pub struct DefaultHeadersInterceptor {
    headers: HeaderMap,
}

impl DefaultHeadersInterceptor {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }
}

#[async_trait]
impl Interceptor for DefaultHeadersInterceptor {
    fn name(&self) -> &str {
        "default-headers"
    }

    async fn before(&self, request: &mut HttpRequest) -> Result<(), ProblemsError> {
        for (name, value) in &self.headers {
            if !request.headers.contains_key(name) {
                request.headers.insert(name.clone(), value.clone());
            }
        }
        Ok(())
    }
}

/// Fails the exchange with a `CONNECTION_PROBLEM` when the rest of the chain
/// does not complete in time.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutInterceptor {
    timeout: Duration,
}

impl TimeoutInterceptor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Interceptor for TimeoutInterceptor {
    fn name(&self) -> &str {
        "timeout"
    }

    async fn intercept(
        &self,
        request: &mut HttpRequest,
        next: Next<'_>,
    ) -> Result<HttpResponse, ProblemsError> {
        match tokio::time::timeout(self.timeout, next.proceed(request)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(
                    "exchange timed out (timeout_ms={})",
                    self.timeout.as_millis()
                );
                Err(ProblemsError::connection(format!(
                    "request timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

/// Logs each request and the status of its response.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor;

#[async_trait]
impl Interceptor for LoggingInterceptor {
    fn name(&self) -> &str {
        "logging"
    }

    async fn before(&self, request: &mut HttpRequest) -> Result<(), ProblemsError> {
        info!(
            "sending request (method={}, url={})",
            request.method, request.url
        );
        Ok(())
    }

    async fn after(
        &self,
        request: &HttpRequest,
        response: &mut HttpResponse,
    ) -> Result<(), ProblemsError> {
        info!(
            "received response (method={}, url={}, status={}, body_len={})",
            request.method,
            request.url,
            response.status.as_u16(),
            response.body.len()
        );
        Ok(())
    }
}

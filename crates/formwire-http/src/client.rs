//! High-level client: URL resolution, request building, error translation.

use crate::chain::InterceptorChain;
use crate::message::{HttpRequest, HttpResponse};
use crate::paging::{Page, PageRequest};
use crate::problems::translate_error_response;
use bytes::Bytes;
use formwire_protocol::{Problem, ProblemsError};
use log::debug;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Client sending every request through an interceptor chain.
#[derive(Clone)]
pub struct HttpClient {
    base_url: Option<Url>,
    chain: InterceptorChain,
}

impl HttpClient {
    pub fn new(chain: InterceptorChain) -> Self {
        Self {
            base_url: None,
            chain,
        }
    }

    /// Resolve relative paths against `base_url`.
    pub fn with_base_url(mut self, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        self.base_url = Some(base_url);
        self
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn chain(&self) -> &InterceptorChain {
        &self.chain
    }

    /// Resolve `path` to an absolute URL.
    ///
    /// Absolute URLs pass through. Relative paths, with or without a leading
    /// slash, are appended to the base URL's path.
    pub fn resolve(&self, path: &str) -> Result<Url, ProblemsError> {
        if let Ok(url) = Url::parse(path) {
            return Ok(url);
        }
        let base = self.base_url.as_ref().ok_or_else(|| {
            Problem::invalid_request(format!("relative url without base url: {path}"))
        })?;
        base.join(path.trim_start_matches('/'))
            .map_err(|err| Problem::invalid_request(format!("invalid url {path}: {err}")).into())
    }

    /// Start building a request.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder<'_> {
        RequestBuilder {
            client: self,
            request: self
                .resolve(path)
                .map(|url| HttpRequest::new(method, url)),
        }
    }

    pub fn get(&self, path: &str) -> RequestBuilder<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder<'_> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> RequestBuilder<'_> {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> RequestBuilder<'_> {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder<'_> {
        self.request(Method::DELETE, path)
    }

    /// Run a request through the chain; non-2xx responses become problems.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ProblemsError> {
        let method = request.method.clone();
        let url = request.url.clone();
        let response = self.chain.proceed(request).await?;
        if !response.is_success() {
            debug!(
                "request failed (method={}, url={}, status={})",
                method,
                url,
                response.status.as_u16()
            );
            return Err(translate_error_response(&response));
        }
        Ok(response)
    }

    /// Fetch one page of a paginated collection.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        page: &PageRequest,
    ) -> Result<Page<T>, ProblemsError> {
        self.get(path).query(&page.to_query()).send_json().await
    }
}

/// Builder for a single request. Construction errors surface on `send`.
pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    request: Result<HttpRequest, ProblemsError>,
}

impl RequestBuilder<'_> {
    /// Append query parameters.
    pub fn query<K: AsRef<str>, V: AsRef<str>>(mut self, pairs: &[(K, V)]) -> Self {
        if pairs.is_empty() {
            return self;
        }
        if let Ok(request) = &mut self.request {
            request.url.query_pairs_mut().extend_pairs(pairs.iter());
        }
        self
    }

    /// Set a header, replacing any previous value.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.request = self.request.and_then(|mut request| {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| Problem::invalid_request(format!("invalid header {name}: {err}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|err| Problem::invalid_request(format!("invalid header {name}: {err}")))?;
            request.headers.insert(header_name, header_value);
            Ok(request)
        });
        self
    }

    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("authorization", &format!("Bearer {token}"))
    }

    /// Serialize `body` as JSON.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(bytes) => self.body(bytes, "application/json"),
            Err(err) => self.fail(Problem::invalid_request(format!(
                "failed to encode json body: {err}"
            ))),
        }
    }

    /// Encode `pairs` as `application/x-www-form-urlencoded`.
    pub fn form<K: AsRef<str>, V: AsRef<str>>(self, pairs: &[(K, V)]) -> Self {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs.iter())
            .finish();
        self.body(encoded, "application/x-www-form-urlencoded")
    }

    /// Set a raw body and its content type.
    pub fn body(self, body: impl Into<Bytes>, content_type: &str) -> Self {
        let body = body.into();
        let builder = self.header(CONTENT_TYPE.as_str(), content_type);
        RequestBuilder {
            client: builder.client,
            request: builder.request.map(|mut request| {
                request.body = Some(body);
                request
            }),
        }
    }

    /// Finish building without sending.
    pub fn build(self) -> Result<HttpRequest, ProblemsError> {
        self.request
    }

    pub async fn send(self) -> Result<HttpResponse, ProblemsError> {
        let request = self.request?;
        self.client.execute(request).await
    }

    /// Send and decode a JSON response body.
    pub async fn send_json<T: DeserializeOwned>(self) -> Result<T, ProblemsError> {
        let needs_accept = matches!(
            &self.request,
            Ok(request) if !request.headers.contains_key(ACCEPT)
        );
        let builder = if needs_accept {
            self.header(ACCEPT.as_str(), "application/json")
        } else {
            self
        };
        builder.send().await?.json()
    }

    fn fail(mut self, problem: Problem) -> Self {
        if self.request.is_ok() {
            self.request = Err(problem.into());
        }
        self
    }
}

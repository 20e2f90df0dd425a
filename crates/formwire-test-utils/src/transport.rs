use async_trait::async_trait;
use bytes::Bytes;
use formwire_http::{HeaderValue, HttpRequest, HttpResponse, StatusCode, Transport};
use formwire_protocol::{Problem, ProblemsError};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// Build a JSON response with an explicit content type.
pub fn json_response(status: u16, content_type: &'static str, body: &Value) -> HttpResponse {
    let mut response = HttpResponse::new(status_code(status));
    response.headers.insert(
        formwire_http::HeaderName::from_static("content-type"),
        HeaderValue::from_static(content_type),
    );
    response.body = Bytes::from(body.to_string());
    response
}

/// Build an `application/problems+json` response.
pub fn problems_response(status: u16, problems: &[Problem]) -> HttpResponse {
    let body = serde_json::to_value(problems).unwrap_or(Value::Null);
    json_response(status, "application/problems+json", &body)
}

/// Build a `text/plain` response.
pub fn text_response(status: u16, body: &str) -> HttpResponse {
    let mut response = HttpResponse::new(status_code(status));
    response.headers.insert(
        formwire_http::HeaderName::from_static("content-type"),
        HeaderValue::from_static("text/plain"),
    );
    response.body = Bytes::from(body.to_string());
    response
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Transport replaying scripted outcomes and recording every request.
///
/// When the script is exhausted it answers `200` with an empty JSON object.
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<Result<HttpResponse, ProblemsError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: HttpResponse) -> Self {
        self.script.lock().push_back(Ok(response));
        self
    }

    pub fn respond_json(self, status: u16, body: Value) -> Self {
        self.respond(json_response(status, "application/json", &body))
    }

    pub fn fail_connection(self, reason: &str) -> Self {
        self.script
            .lock()
            .push_back(Err(ProblemsError::connection(reason)));
        self
    }

    /// Requests seen so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ProblemsError> {
        self.requests.lock().push(request.clone());
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| {
            Ok(json_response(
                200,
                "application/json",
                &Value::Object(Default::default()),
            ))
        })
    }
}

//! HTTP exchanges wrapped in an ordered interceptor chain.
//!
//! Every exchange flows through [`InterceptorChain::proceed`]: interceptors
//! wrap the rest of the chain like nested scopes and the terminal
//! [`Transport`] performs the network call. Failures of any kind surface as
//! a single [`ProblemsError`](formwire_protocol::ProblemsError).

mod chain;
mod client;
mod interceptors;
mod message;
mod paging;
mod problems;
mod transport;

/// Interceptor chain primitives.
pub use chain::{ExchangePhase, Interceptor, InterceptorChain, Next};
/// High-level client and request builder.
pub use client::{HttpClient, RequestBuilder};
/// Built-in interceptors.
pub use interceptors::{DefaultHeadersInterceptor, LoggingInterceptor, TimeoutInterceptor};
/// Request and response values passed through the chain.
pub use message::{HttpRequest, HttpResponse};
/// Pagination models.
pub use paging::{Page, PageRequest, SortDirection, SortOrder};
/// Error-response translation.
pub use problems::{PROBLEM_CONTENT_TYPE, PROBLEMS_CONTENT_TYPE, translate_error_response};
/// Network transport interface and the reqwest implementation.
pub use transport::{ReqwestTransport, Transport};

pub use reqwest::header;
pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
pub use reqwest::{Method, StatusCode};
pub use url::Url;

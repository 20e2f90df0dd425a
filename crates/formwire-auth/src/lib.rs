//! OAuth 2.0 Authorization Code flow with PKCE.
//!
//! [`OAuthClient`] drives login, token exchange, refresh and logout against
//! an authorization server. Tokens live in a [`TokenSession`] backed by a
//! [`JsonStore`](formwire_storage::JsonStore), and [`BearerInterceptor`]
//! attaches them to outgoing requests.

mod client;
mod config;
mod error;
mod interceptor;
pub mod pkce;
mod session;
mod tokens;

pub use client::{AuthorizationCallback, OAuthClient, parse_callback};
pub use config::OAuthConfig;
pub use error::AuthError;
pub use interceptor::BearerInterceptor;
pub use pkce::PkceChallenge;
pub use session::TokenSession;
pub use tokens::{TokenResponse, TokenSet};

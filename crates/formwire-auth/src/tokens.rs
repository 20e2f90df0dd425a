//! Token endpoint payloads and the persisted token set.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tokens are treated as expired this long before their real expiry.
pub const EXPIRY_LEEWAY: Duration = Duration::seconds(30);

/// Successful token endpoint response (RFC 6749 section 5.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Tokens held for an authenticated client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenSet {
    pub fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: response.refresh_token,
            id_token: response.id_token,
            expires_at: response
                .expires_in
                .and_then(|seconds| expiry_from(issued_at, seconds)),
            scope: response.scope,
        }
    }

    /// Carry over fields a refresh response may omit.
    pub fn inherit(mut self, previous: &TokenSet) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.refresh_token.clone();
        }
        if self.id_token.is_none() {
            self.id_token = previous.id_token.clone();
        }
        self
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let deadline = now.checked_add_signed(EXPIRY_LEEWAY).unwrap_or(now);
        self.expires_at
            .is_some_and(|expires_at| deadline >= expires_at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// A negative lifetime counts as already expired; one past the calendar range never expires.
fn expiry_from(issued_at: DateTime<Utc>, seconds: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(seconds.max(0)).and_then(|ttl| issued_at.checked_add_signed(ttl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("time")
    }

    fn response(expires_in: Option<i64>) -> TokenResponse {
        TokenResponse {
            access_token: "access".into(),
            token_type: None,
            expires_in,
            refresh_token: Some("refresh".into()),
            id_token: None,
            scope: None,
        }
    }

    #[test]
    fn expiry_is_computed_from_issue_time() {
        let tokens = TokenSet::from_response(response(Some(300)), issued_at());
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_at, Some(issued_at() + Duration::seconds(300)));
        assert!(!tokens.is_expired_at(issued_at() + Duration::seconds(200)));
        assert!(tokens.is_expired_at(issued_at() + Duration::seconds(280)));
    }

    #[test]
    fn tokens_without_expiry_never_expire() {
        let tokens = TokenSet::from_response(response(None), issued_at());
        assert!(!tokens.is_expired_at(issued_at() + Duration::days(365)));
    }

    #[test]
    fn refreshed_tokens_inherit_refresh_token() {
        let previous = TokenSet::from_response(response(Some(60)), issued_at());
        let mut refreshed = response(Some(60));
        refreshed.access_token = "next".into();
        refreshed.refresh_token = None;
        let tokens = TokenSet::from_response(refreshed, issued_at()).inherit(&previous);
        assert_eq!(tokens.access_token, "next");
        assert_eq!(tokens.refresh_token.as_deref(), Some("refresh"));
    }

    #[test]
    fn out_of_range_lifetime_never_expires() {
        let tokens = TokenSet::from_response(response(Some(9_000_000_000_000)), issued_at());
        assert_eq!(tokens.expires_at, None);
        assert!(!tokens.is_expired_at(issued_at()));

        let tokens = TokenSet::from_response(response(Some(i64::MAX)), issued_at());
        assert_eq!(tokens.expires_at, None);
    }

    #[test]
    fn negative_lifetime_is_already_expired() {
        let tokens = TokenSet::from_response(response(Some(-60)), issued_at());
        assert_eq!(tokens.expires_at, Some(issued_at()));
        assert!(tokens.is_expired_at(issued_at()));

        let tokens = TokenSet::from_response(response(Some(i64::MIN)), issued_at());
        assert!(tokens.is_expired_at(issued_at()));
    }

    #[test]
    fn expiry_check_tolerates_the_end_of_time() {
        let tokens = TokenSet::from_response(response(Some(60)), issued_at());
        assert!(tokens.is_expired_at(DateTime::<Utc>::MAX_UTC));
    }
}

//! In-memory token cache persisted to a JSON store.

use crate::error::AuthError;
use crate::tokens::TokenSet;
use formwire_storage::JsonStore;
use log::{debug, warn};
use parking_lot::RwLock;
use std::sync::Arc;

/// Tokens for one client, stored under `tokens.<client_id>`.
#[derive(Clone)]
pub struct TokenSession {
    key: String,
    store: JsonStore,
    current: Arc<RwLock<Option<TokenSet>>>,
}

impl TokenSession {
    pub fn new(store: JsonStore, client_id: &str) -> Self {
        Self {
            key: format!("tokens.{client_id}"),
            store,
            current: Arc::new(RwLock::new(None)),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current tokens, loading persisted ones on first access.
    pub fn tokens(&self) -> Option<TokenSet> {
        if let Some(tokens) = self.current.read().clone() {
            return Some(tokens);
        }
        match self.store.get::<TokenSet>(&self.key) {
            Ok(Some(tokens)) => {
                debug!("restored tokens (key={})", self.key);
                *self.current.write() = Some(tokens.clone());
                Some(tokens)
            }
            Ok(None) => None,
            Err(err) => {
                warn!("failed to load tokens (key={}, error={})", self.key, err);
                None
            }
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens().map(|tokens| tokens.access_token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens().is_some()
    }

    pub fn store(&self, tokens: TokenSet) -> Result<(), AuthError> {
        self.store.set(&self.key, &tokens)?;
        *self.current.write() = Some(tokens);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), AuthError> {
        self.current.write().take();
        self.store.remove(&self.key)?;
        debug!("cleared tokens (key={})", self.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwire_storage::MemoryBackend;
    use pretty_assertions::assert_eq;

    fn tokens(access: &str) -> TokenSet {
        TokenSet {
            access_token: access.into(),
            token_type: "Bearer".into(),
            refresh_token: None,
            id_token: None,
            expires_at: None,
            scope: None,
        }
    }

    #[test]
    fn tokens_persist_across_sessions() {
        let store = JsonStore::new("app", Arc::new(MemoryBackend::new()));
        let first = TokenSession::new(store.clone(), "web");
        first.store(tokens("a1")).expect("store");

        let second = TokenSession::new(store.clone(), "web");
        assert_eq!(second.access_token().as_deref(), Some("a1"));
        assert_eq!(store.keys().expect("keys"), vec!["tokens.web".to_string()]);
    }

    #[test]
    fn clear_removes_cached_and_stored_tokens() {
        let store = JsonStore::new("app", Arc::new(MemoryBackend::new()));
        let session = TokenSession::new(store.clone(), "web");
        session.store(tokens("a1")).expect("store");
        session.clear().expect("clear");
        assert!(!session.is_authenticated());
        assert!(store.keys().expect("keys").is_empty());
    }
}

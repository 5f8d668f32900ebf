//! Session State
//!
//! Typed view over the persisted session keys. Every read and write of
//! the session goes through one of the transitions below.

use crate::domain::ports::SessionStore;
use std::sync::Arc;

/// Persisted session credential.
pub const TOKEN_KEY: &str = "token";
/// Persisted display identity.
pub const USERNAME_KEY: &str = "username";
/// Last known subscription aggregation flag, `"true"` or `"false"`.
pub const FEATURE_CACHE_KEY: &str = "subscriptionAggregationEnabled";

/// Session state backed by a [`SessionStore`].
///
/// Store failures never escape: reads log and report the key as absent,
/// writes log and carry on.
#[derive(Clone)]
pub struct SessionState {
    store: Arc<dyn SessionStore>,
}

impl SessionState {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Current session token, if any. An empty token counts as absent.
    pub async fn token(&self) -> Option<String> {
        self.read(TOKEN_KEY).await.filter(|t| !t.is_empty())
    }

    pub async fn username(&self) -> Option<String> {
        self.read(USERNAME_KEY).await
    }

    /// Store fresh credentials after a login.
    pub async fn set_token(&self, token: &str, username: &str) {
        self.write(TOKEN_KEY, token).await;
        self.write(USERNAME_KEY, username).await;
    }

    /// Forget the token and identity. The feature cache is kept.
    pub async fn clear_session(&self) {
        for key in [TOKEN_KEY, USERNAME_KEY] {
            if let Err(e) = self.store.remove(key).await {
                tracing::error!("failed to remove session key {}: {}", key, e);
            }
        }
    }

    /// Cached aggregation flag. Anything other than `"true"` reads as false.
    pub async fn feature_cache(&self) -> Option<bool> {
        self.read(FEATURE_CACHE_KEY).await.map(|v| v == "true")
    }

    pub async fn set_feature_cache(&self, enabled: bool) {
        let value = if enabled { "true" } else { "false" };
        self.write(FEATURE_CACHE_KEY, value).await;
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("failed to read session key {}: {}", key, e);
                None
            }
        }
    }

    async fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value).await {
            tracing::error!("failed to write session key {}: {}", key, e);
        }
    }
}

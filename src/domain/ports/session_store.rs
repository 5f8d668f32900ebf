//! Session Store Port
//!
//! Persisted string key/value storage surviving between navigations,
//! the client-side equivalent of browser local storage.

use async_trait::async_trait;

/// Failure reading or writing persisted session data.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Key/value store for session data.
///
/// No locking is implied; concurrent writers to the same key are
/// last-writer-wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value, `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Create or overwrite a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

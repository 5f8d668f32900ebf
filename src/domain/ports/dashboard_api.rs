//! Dashboard API Port
//!
//! Defines the backend calls the navigation guard and login flow depend on.
//! Implementations may talk HTTP or be in-memory test doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of `GET /auth/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether the backend enforces credentials at all
    #[serde(rename = "authEnabled", default)]
    pub auth_enabled: bool,
}

/// Credentials issued by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub token: String,
    pub username: String,
    /// Token lifetime in seconds, when the backend reports one
    pub expires_in: Option<u64>,
}

/// Failure talking to the dashboard backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Request never produced a response (connect error, timeout, ...)
    #[error("transport error: {0}")]
    Transport(String),
    /// Backend answered with a non-success status
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    /// Response body did not have the expected shape
    #[error("malformed response: {0}")]
    Decode(String),
    /// Backend answered but refused the request
    #[error("rejected: {0}")]
    Rejected(String),
}

impl ApiError {
    /// Whether the backend was reached and explicitly said no.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Status { .. } | ApiError::Rejected(_))
    }
}

/// Backend API used by the dashboard client.
///
/// This is an outbound port. Every method is a single attempt; callers
/// decide what a failure means.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Whether authentication is globally enabled.
    async fn auth_status(&self) -> Result<AuthStatus, ApiError>;

    /// Check a session token. `Ok(())` means the token is valid.
    async fn verify_token(&self, token: &str) -> Result<(), ApiError>;

    /// Whether the subscription aggregation feature is switched on.
    async fn subscription_aggregation_enabled(&self, token: Option<&str>)
        -> Result<bool, ApiError>;

    /// Exchange credentials for a session token.
    async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, ApiError>;
}

//! Auth Service
//!
//! Login and logout: the two places a session is created or ended
//! outside of the navigation guard.

use crate::application::session::SessionState;
use crate::domain::ports::{ApiError, DashboardApi, LoginGrant};
use std::sync::Arc;

pub struct AuthService {
    api: Arc<dyn DashboardApi>,
    session: SessionState,
}

impl AuthService {
    pub fn new(api: Arc<dyn DashboardApi>, session: SessionState) -> Self {
        Self { api, session }
    }

    /// Log in and persist the issued token and username.
    ///
    /// On failure the existing session is left as it was.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let grant = self.api.login(username, password).await.map_err(|e| {
            tracing::warn!("login failed for {}: {}", username, e);
            e
        })?;

        self.session.set_token(&grant.token, &grant.username).await;
        tracing::info!("logged in as {}", grant.username);
        Ok(grant)
    }

    pub async fn logout(&self) {
        self.session.clear_session().await;
        tracing::info!("logged out");
    }

    pub async fn current_user(&self) -> Option<String> {
        if self.session.token().await.is_some() {
            self.session.username().await
        } else {
            None
        }
    }
}

//! HTTP Dashboard API
//!
//! Implements DashboardApi against the dashboard backend's JSON HTTP API.

use crate::domain::ports::{ApiError, AuthStatus, DashboardApi, LoginGrant};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of `GET /settings/subscription-aggregation`.
#[derive(Debug, Deserialize)]
struct FeatureSetting {
    #[serde(default)]
    enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Body of `POST /auth/login`, success or failure.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    token: Option<String>,
    username: Option<String>,
    #[serde(rename = "expiresIn")]
    expires_in: Option<u64>,
    message: Option<String>,
}

/// Error body the backend sends with non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct HttpApiConfig {
    /// API root including the `/api` prefix (e.g., "http://127.0.0.1:5001/api")
    pub base_url: String,
    /// Timeout for each request
    pub timeout: Duration,
}

impl Default for HttpApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5001/api".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// reqwest-backed dashboard API client.
///
/// Session tokens are sent as `Authorization: Bearer <token>`.
pub struct HttpDashboardApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDashboardApi {
    pub fn new(config: HttpApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        let request = self.client.get(self.url(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            return Err(ApiError::Status { status, message });
        }

        Ok(response)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn auth_status(&self) -> Result<AuthStatus, ApiError> {
        let response = Self::send(self.get("/auth/status", None)).await?;
        Self::decode(response).await
    }

    async fn verify_token(&self, token: &str) -> Result<(), ApiError> {
        Self::send(self.get("/auth/verify", Some(token))).await?;
        Ok(())
    }

    async fn subscription_aggregation_enabled(
        &self,
        token: Option<&str>,
    ) -> Result<bool, ApiError> {
        let response = Self::send(self.get("/settings/subscription-aggregation", token)).await?;
        let setting: FeatureSetting = Self::decode(response).await?;
        Ok(setting.enabled.unwrap_or(false))
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { username, password });
        let response = Self::send(request).await?;
        let body: LoginResponse = Self::decode(response).await?;

        if !body.success {
            return Err(ApiError::Rejected(
                body.message.unwrap_or_else(|| "login refused".to_string()),
            ));
        }

        let token = body
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Decode("login response has no token".to_string()))?;

        Ok(LoginGrant {
            token,
            username: body.username.unwrap_or_else(|| username.to_string()),
            expires_in: body.expires_in,
        })
    }
}

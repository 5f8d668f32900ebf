use crate::adapters::outbound::HttpApiConfig;
use crate::application::{FailurePolicy, GuardPolicy};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Backend API settings
    pub api_base_url: String,
    pub request_timeout_secs: u64,

    // Session persistence; in-memory when unset
    pub session_db_path: Option<String>,

    // Guard settings
    pub auth_status_fail_open: bool,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5001/api".to_string(),
            request_timeout_secs: 10,
            session_db_path: None,
            auth_status_fail_open: true,
            debug: false,
        }
    }
}

impl Config {
    pub fn http_api(&self) -> HttpApiConfig {
        HttpApiConfig {
            base_url: self.api_base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn guard_policy(&self) -> GuardPolicy {
        GuardPolicy {
            auth_status: if self.auth_status_fail_open {
                FailurePolicy::Allow
            } else {
                FailurePolicy::Deny
            },
            ..GuardPolicy::default()
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let api_base_url = std::env::var("DASHGATE_API_BASE_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:5001/api".to_string());

    let request_timeout_secs = std::env::var("DASHGATE_REQUEST_TIMEOUT_SECS")
        .unwrap_or_else(|_| "10".to_string())
        .parse()
        .unwrap_or(10);

    let session_db_path = std::env::var("DASHGATE_SESSION_DB_PATH")
        .ok()
        .filter(|p| !p.is_empty());

    let auth_status_fail_open = std::env::var("DASHGATE_AUTH_STATUS_FAIL_OPEN")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(true);

    let debug = std::env::var("DEBUG").is_ok();

    if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
        anyhow::bail!(
            "DASHGATE_API_BASE_URL must be an http(s) URL, got {}",
            api_base_url
        );
    }

    Ok(Config {
        api_base_url,
        request_timeout_secs,
        session_db_path,
        auth_status_fail_open,
        debug,
    })
}

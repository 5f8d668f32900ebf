mod dashmap_session_store;
mod http_dashboard_api;
mod sqlite_session_store;

pub use dashmap_session_store::DashMapSessionStore;
pub use http_dashboard_api::{HttpApiConfig, HttpDashboardApi};
pub use sqlite_session_store::SqliteSessionStore;

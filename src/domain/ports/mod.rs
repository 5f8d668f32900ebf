mod dashboard_api;
mod session_store;

pub use dashboard_api::{ApiError, AuthStatus, DashboardApi, LoginGrant};
pub use session_store::{SessionStore, StoreError};

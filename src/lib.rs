//! dashgate Library
//!
//! Navigation guard, session state and shared record types for the proxy
//! management dashboard client.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

// Re-export commonly used types
pub use adapters::outbound::{DashMapSessionStore, HttpApiConfig, HttpDashboardApi, SqliteSessionStore};
pub use application::{AuthService, FailurePolicy, GuardPolicy, NavigationGuard, SessionState};
pub use config::load_config;
pub use domain::entities::{Agent, ProxyGroup, ProxyNode, Route, Rule, RuleSet, Subscription};
pub use domain::ports::{ApiError, DashboardApi, SessionStore, StoreError};
pub use domain::services::RouteTable;
pub use domain::value_objects::NavigationOutcome;

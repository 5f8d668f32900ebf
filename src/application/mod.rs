//! Application Layer
//!
//! Use cases built on the domain ports: the navigation guard, login and
//! logout, and the session state they share.

mod auth_service;
mod navigation_guard;
pub mod session;

pub use auth_service::AuthService;
pub use navigation_guard::{FailurePolicy, GuardPolicy, NavigationGuard};
pub use session::SessionState;

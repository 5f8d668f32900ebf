//! Domain Layer
//!
//! Dashboard records, routing vocabulary and the ports the application
//! layer depends on. No I/O lives here.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{Agent, ProxyGroup, ProxyNode, Route, Rule, RuleSet, Subscription};
pub use value_objects::{
    AgentStatus, Capability, DeploymentMethod, LegacyGroupSource, LoadBalanceStrategy,
    NavigationOutcome, ServiceType,
};

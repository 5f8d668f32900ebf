//! Value Objects - Immutable domain primitives
//!
//! Enumerated string fields of the dashboard records, plus the small
//! vocabulary the navigation guard speaks (capabilities and outcomes).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Load-balancing strategy of a proxy group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadBalanceStrategy {
    RoundRobin,
    ConsistentHashing,
    StickySessions,
}

impl LoadBalanceStrategy {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round-robin",
            Self::ConsistentHashing => "consistent-hashing",
            Self::StickySessions => "sticky-sessions",
        }
    }
}

/// Member source of a proxy group in the legacy record layout.
///
/// Only ever read; newer records carry explicit member lists instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyGroupSource {
    Subscription,
    Node,
    Strategy,
}

/// Kind of service an agent controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Proxy core
    Mihomo,
    /// DNS resolver
    Mosdns,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mihomo => "mihomo",
            Self::Mosdns => "mosdns",
        }
    }

    pub fn is_dns_resolver(&self) -> bool {
        matches!(self, Self::Mosdns)
    }
}

/// How an agent was installed on its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMethod {
    Shell,
    Docker,
    Unknown,
}

impl Default for DeploymentMethod {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Reachability of an agent as last reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Online,
    Offline,
}

/// Feature access a view may demand before it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The subscription aggregation feature must be switched on
    SubscriptionAggregation,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::SubscriptionAggregation => write!(f, "subscription-aggregation"),
        }
    }
}

/// Terminal decision of one guard run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Render the requested view
    Allow,
    /// Navigate somewhere else instead
    Redirect(String),
    /// A newer navigation started before this one finished; nothing was applied
    Superseded,
}

impl NavigationOutcome {
    pub fn redirect(path: impl Into<String>) -> Self {
        Self::Redirect(path.into())
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Redirect target, if any.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Redirect(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for NavigationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationOutcome::Allow => write!(f, "allow"),
            NavigationOutcome::Redirect(path) => write!(f, "redirect {}", path),
            NavigationOutcome::Superseded => write!(f, "superseded"),
        }
    }
}

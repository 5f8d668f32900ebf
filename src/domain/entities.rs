//! Domain Entities - Records exchanged with the dashboard backend
//!
//! The backend owns these records; the client mirrors them read-only.
//! Relationships between them (a node's subscription, a group's members)
//! are informational copies and are never checked here.

use crate::domain::value_objects::{
    AgentStatus, Capability, DeploymentMethod, LegacyGroupSource, LoadBalanceStrategy,
    ServiceType,
};
use serde::{Deserialize, Serialize};

/// A remote source of proxy node definitions, fetched periodically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    /// Source URL
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub enabled: bool,
    /// Refresh interval in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_node_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_updated_at: Option<String>,
}

/// A single proxy endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyNode {
    pub id: String,
    pub name: String,
    /// Connection string such as `ss://...`, `vmess://...` or `trojan://...`
    pub proxy_string: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    /// Display copy of the owning subscription's name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_name: Option<String>,
}

impl ProxyNode {
    /// Protocol scheme of the connection string (`vmess`, `trojan`, ...).
    pub fn protocol(&self) -> Option<&str> {
        let (scheme, _) = self.proxy_string.split_once("://")?;
        if scheme.is_empty() {
            None
        } else {
            Some(scheme)
        }
    }
}

/// A routing directive mapping a traffic matcher to a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub rule_type: String,
    pub value: String,
    pub policy: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Rule {
    /// Sort rules by their explicit order.
    ///
    /// The sort is stable, so equal orders keep list position. Rules
    /// without an order follow all ordered rules in list order.
    pub fn sort_by_order(rules: &mut [Rule]) {
        rules.sort_by_key(|r| (r.order.is_none(), r.order.unwrap_or_default()));
    }
}

/// A remote rule provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub id: String,
    pub name: String,
    pub url: String,
    pub behavior: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Entry in the rule library this set was created from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_rule_id: Option<String>,
}

/// A named, load-balanced collection of nodes, subscriptions and groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyGroup {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub enabled: bool,
    /// Health-check URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriptions: Option<Vec<String>>,
    /// Filter applied to node names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_nodes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<LoadBalanceStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy: Option<bool>,

    // Legacy layout, read but never written back.
    #[serde(default, skip_serializing)]
    pub proxies: Option<Vec<String>>,
    #[serde(default, skip_serializing)]
    pub source: Option<LegacyGroupSource>,
}

impl ProxyGroup {
    /// Whether the record still uses the legacy member layout.
    pub fn is_legacy(&self) -> bool {
        self.proxies.is_some() || self.source.is_some()
    }
}

/// A remote host running a proxy core or a DNS resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub token: String,
    pub service_type: ServiceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_method: Option<DeploymentMethod>,
    pub status: AgentStatus,
    pub last_heartbeat: String,
    pub version: String,
    pub config_version: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_update: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// CPU usage percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Memory usage percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<f64>,
}

impl Agent {
    /// `host:port` of the agent's control API.
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == AgentStatus::Online
    }

    pub fn update_available(&self) -> bool {
        self.has_update.unwrap_or(false)
    }
}

/// A dashboard view the router can navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    /// View name; `None` when no view matched the path
    pub name: Option<&'static str>,
    /// Feature access required before the view is shown
    pub requires: Option<Capability>,
}

impl Route {
    pub fn new(path: impl Into<String>, name: &'static str) -> Self {
        Self {
            path: path.into(),
            name: Some(name),
            requires: None,
        }
    }

    /// A path that matched no known view.
    pub fn unmatched(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            requires: None,
        }
    }

    pub fn requiring(mut self, capability: Capability) -> Self {
        self.requires = Some(capability);
        self
    }

    pub fn requires_subscription_aggregation(&self) -> bool {
        self.requires == Some(Capability::SubscriptionAggregation)
    }
}

//! Route Table Service
//!
//! Pure domain logic mapping dashboard paths to views.
//! This service has NO external dependencies - it's pure Rust.

use crate::domain::entities::Route;
use crate::domain::value_objects::Capability;

/// Path of the login view. Always reachable.
pub const LOGIN_PATH: &str = "/login";

/// Where a denied feature view sends the user instead.
pub const FEATURE_FALLBACK_PATH: &str = "/subscriptions";

/// Static redirects applied before any view is matched.
const REDIRECTS: &[(&str, &str)] = &[("/", "/dashboard")];

/// Known views: (path, name, required capability).
const VIEWS: &[(&str, &str, Option<Capability>)] = &[
    (LOGIN_PATH, "Login", None),
    ("/dashboard", "Dashboard", None),
    ("/subscriptions", "Subscriptions", None),
    ("/nodes", "Nodes", None),
    (
        "/subscription-aggregation",
        "SubscriptionAggregation",
        Some(Capability::SubscriptionAggregation),
    ),
    ("/rule-library", "RuleLibrary", None),
    ("/rules", "Rules", None),
    ("/proxy-groups", "ProxyGroups", None),
    ("/generate", "Generate", None),
    ("/agents", "Agents", None),
    ("/logs", "Logs", None),
];

/// Dashboard route table.
///
/// Resolution strips any query string or fragment, ignores a trailing
/// slash, follows static redirects, then looks the path up. Paths that
/// match no view resolve to an unnamed route with no requirements.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Table with the standard dashboard views.
    pub fn dashboard() -> Self {
        let routes = VIEWS
            .iter()
            .map(|(path, name, requires)| {
                let route = Route::new(*path, *name);
                match requires {
                    Some(capability) => route.requiring(*capability),
                    None => route,
                }
            })
            .collect();
        Self { routes }
    }

    /// All known views in declaration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Resolve a requested location to the route that would render.
    pub fn resolve(&self, location: &str) -> Route {
        let path = Self::normalize(location);
        let path = REDIRECTS
            .iter()
            .find(|(from, _)| *from == path)
            .map(|(_, to)| *to)
            .unwrap_or(path);

        self.routes
            .iter()
            .find(|r| r.path == path)
            .cloned()
            .unwrap_or_else(|| Route::unmatched(path))
    }

    fn normalize(location: &str) -> &str {
        let end = location.find(|c: char| c == '?' || c == '#').unwrap_or(location.len());
        let path = &location[..end];
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            "/"
        } else {
            trimmed
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::dashboard()
    }
}

//! Navigation Guard - Main application use case
//!
//! Gates every dashboard view transition on authentication state and
//! per-route feature requirements. Each run ends in exactly one
//! [`NavigationOutcome`].

use crate::application::session::SessionState;
use crate::domain::entities::Route;
use crate::domain::ports::{ApiError, DashboardApi, SessionStore};
use crate::domain::services::{RouteTable, FEATURE_FALLBACK_PATH, LOGIN_PATH};
use crate::domain::value_objects::{Capability, NavigationOutcome};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// What a check concludes when its backend call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Treat the failure as a pass
    Allow,
    /// Treat the failure as a denial
    Deny,
    /// Use the last persisted result; no cached result means `Deny`
    UseCache,
}

/// Failure policy for each remote check the guard performs.
///
/// `verify` only governs transport failures; a token the backend
/// explicitly rejects is always denied. Only the aggregation check has a
/// cache, so `UseCache` elsewhere behaves as `Deny`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardPolicy {
    pub auth_status: FailurePolicy,
    pub verify: FailurePolicy,
    pub aggregation: FailurePolicy,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            auth_status: FailurePolicy::Allow,
            verify: FailurePolicy::Deny,
            aggregation: FailurePolicy::UseCache,
        }
    }
}

/// Navigation guard.
///
/// Each navigation takes a generation number. A run that finds a newer
/// generation before a side effect or before returning stops with
/// [`NavigationOutcome::Superseded`] and leaves the session untouched.
pub struct NavigationGuard {
    api: Arc<dyn DashboardApi>,
    session: SessionState,
    routes: RouteTable,
    policy: GuardPolicy,
    generation: AtomicU64,
}

impl NavigationGuard {
    /// Create a guard over the standard dashboard routes.
    pub fn new(api: Arc<dyn DashboardApi>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            session: SessionState::new(store),
            routes: RouteTable::dashboard(),
            policy: GuardPolicy::default(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_policy(mut self, policy: GuardPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn policy(&self) -> &GuardPolicy {
        &self.policy
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Resolve both locations through the route table and run the guard.
    pub async fn navigate(&self, to: &str, from: &str) -> NavigationOutcome {
        let target = self.routes.resolve(to);
        let current = self.routes.resolve(from);
        self.guard(&target, &current).await
    }

    /// Decide whether `to` may render.
    pub async fn guard(&self, to: &Route, from: &Route) -> NavigationOutcome {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("navigation #{} {} -> {}", ticket, from.path, to.path);

        if to.path == LOGIN_PATH {
            return self.finish(ticket, NavigationOutcome::Allow);
        }

        let auth_enabled = match self.api.auth_status().await {
            Ok(status) => status.auth_enabled,
            Err(e) => {
                tracing::error!("failed to check auth status: {}", e);
                let outcome = match self.policy.auth_status {
                    FailurePolicy::Allow => NavigationOutcome::Allow,
                    FailurePolicy::Deny | FailurePolicy::UseCache => {
                        NavigationOutcome::redirect(LOGIN_PATH)
                    }
                };
                return self.finish(ticket, outcome);
            }
        };

        let token = if auth_enabled {
            let Some(token) = self.session.token().await else {
                tracing::debug!("no session token, redirecting {} to login", to.path);
                return self.finish(ticket, NavigationOutcome::redirect(LOGIN_PATH));
            };

            if let Err(e) = self.api.verify_token(&token).await {
                if !self.verification_failure_allowed(&e) {
                    tracing::warn!("session token verification failed: {}", e);
                    if !self.is_current(ticket) {
                        return self.superseded(ticket);
                    }
                    self.session.clear_session().await;
                    return self.finish(ticket, NavigationOutcome::redirect(LOGIN_PATH));
                }
                tracing::warn!("session token not verified, allowed by policy: {}", e);
            }
            Some(token)
        } else {
            self.session.token().await
        };

        if let Some(capability) = to.requires {
            if !self.capability_granted(ticket, capability, token.as_deref()).await {
                if !self.is_current(ticket) {
                    return self.superseded(ticket);
                }
                tracing::warn!(
                    "access to {} denied: {} is not enabled",
                    to.path,
                    capability
                );
                return self.finish(ticket, NavigationOutcome::redirect(FEATURE_FALLBACK_PATH));
            }
        }

        self.finish(ticket, NavigationOutcome::Allow)
    }

    fn verification_failure_allowed(&self, error: &ApiError) -> bool {
        !error.is_rejection() && self.policy.verify == FailurePolicy::Allow
    }

    async fn capability_granted(
        &self,
        ticket: u64,
        capability: Capability,
        token: Option<&str>,
    ) -> bool {
        match capability {
            Capability::SubscriptionAggregation => {
                match self.api.subscription_aggregation_enabled(token).await {
                    Ok(enabled) => {
                        if self.is_current(ticket) {
                            self.session.set_feature_cache(enabled).await;
                        }
                        enabled
                    }
                    Err(e) => {
                        tracing::error!(
                            "failed to check subscription aggregation status: {}",
                            e
                        );
                        match self.policy.aggregation {
                            FailurePolicy::Allow => true,
                            FailurePolicy::Deny => false,
                            FailurePolicy::UseCache => {
                                self.session.feature_cache().await.unwrap_or(false)
                            }
                        }
                    }
                }
            }
        }
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    fn finish(&self, ticket: u64, outcome: NavigationOutcome) -> NavigationOutcome {
        if !self.is_current(ticket) {
            return self.superseded(ticket);
        }
        tracing::debug!("navigation #{} resolved: {}", ticket, outcome);
        outcome
    }

    fn superseded(&self, ticket: u64) -> NavigationOutcome {
        tracing::debug!("navigation #{} superseded by a newer navigation", ticket);
        NavigationOutcome::Superseded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::DashMapSessionStore;
    use crate::application::session::{FEATURE_CACHE_KEY, TOKEN_KEY, USERNAME_KEY};
    use crate::domain::ports::{AuthStatus, LoginGrant};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::Notify;
    use tracing_test::traced_test;

    // ===== Mock Implementations =====

    #[derive(Clone)]
    enum Reply<T> {
        Ok(T),
        Fail(ApiError),
    }

    impl<T: Clone> Reply<T> {
        fn get(&self) -> Result<T, ApiError> {
            match self {
                Reply::Ok(v) => Ok(v.clone()),
                Reply::Fail(e) => Err(e.clone()),
            }
        }
    }

    fn transport() -> ApiError {
        ApiError::Transport("connection refused".to_string())
    }

    fn unauthorized() -> ApiError {
        ApiError::Status {
            status: 401,
            message: "Invalid or expired token".to_string(),
        }
    }

    struct MockApi {
        auth: Reply<AuthStatus>,
        verify: Reply<()>,
        aggregation: Reply<bool>,
        calls: Mutex<Vec<&'static str>>,
        seen_tokens: Mutex<Vec<Option<String>>>,
        // Holds the auth status call until released.
        gate: Option<Arc<Notify>>,
    }

    impl MockApi {
        fn new(auth_enabled: bool) -> Self {
            Self {
                auth: Reply::Ok(AuthStatus { auth_enabled }),
                verify: Reply::Ok(()),
                aggregation: Reply::Ok(true),
                calls: Mutex::new(Vec::new()),
                seen_tokens: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        fn auth(mut self, reply: Reply<AuthStatus>) -> Self {
            self.auth = reply;
            self
        }

        fn verify(mut self, reply: Reply<()>) -> Self {
            self.verify = reply;
            self
        }

        fn aggregation(mut self, reply: Reply<bool>) -> Self {
            self.aggregation = reply;
            self
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DashboardApi for MockApi {
        async fn auth_status(&self) -> Result<AuthStatus, ApiError> {
            self.calls.lock().unwrap().push("status");
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.auth.get()
        }

        async fn verify_token(&self, _token: &str) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push("verify");
            self.verify.get()
        }

        async fn subscription_aggregation_enabled(
            &self,
            token: Option<&str>,
        ) -> Result<bool, ApiError> {
            self.calls.lock().unwrap().push("aggregation");
            self.seen_tokens
                .lock()
                .unwrap()
                .push(token.map(str::to_string));
            self.aggregation.get()
        }

        async fn login(&self, _username: &str, _password: &str) -> Result<LoginGrant, ApiError> {
            unreachable!("guard never logs in")
        }
    }

    /// Counts writes so tests can assert on accumulated side effects.
    struct CountingStore {
        inner: DashMapSessionStore,
        removes: AtomicUsize,
        sets: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: DashMapSessionStore::new(),
                removes: AtomicUsize::new(0),
                sets: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SessionStore for CountingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, crate::domain::ports::StoreError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), crate::domain::ports::StoreError> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), crate::domain::ports::StoreError> {
            self.removes.fetch_add(1, Ordering::SeqCst);
            self.inner.remove(key).await
        }
    }

    // ===== Test Helpers =====

    fn guard_with(api: MockApi) -> (NavigationGuard, Arc<MockApi>, Arc<DashMapSessionStore>) {
        let api = Arc::new(api);
        let store = Arc::new(DashMapSessionStore::new());
        let guard = NavigationGuard::new(api.clone(), store.clone());
        (guard, api, store)
    }

    async fn logged_in(store: &DashMapSessionStore) {
        store.set(TOKEN_KEY, "jwt-token").await.unwrap();
        store.set(USERNAME_KEY, "admin").await.unwrap();
    }

    const VIEW_PATHS: &[&str] = &[
        "/",
        "/dashboard",
        "/subscriptions",
        "/nodes",
        "/rule-library",
        "/rules",
        "/proxy-groups",
        "/generate",
        "/agents",
        "/logs",
        "/unknown",
    ];

    // ===== Login escape hatch =====

    #[tokio::test]
    async fn test_login_always_allowed_without_backend_calls() {
        let (guard, api, _) = guard_with(MockApi::new(true).auth(Reply::Fail(transport())));

        let outcome = guard.navigate("/login", "/dashboard").await;

        assert_eq!(outcome, NavigationOutcome::Allow);
        assert!(api.calls().is_empty());
    }

    // ===== Auth disabled =====

    #[tokio::test]
    async fn test_auth_disabled_allows_plain_routes() {
        let (guard, api, _) = guard_with(MockApi::new(false));

        for path in VIEW_PATHS {
            assert_eq!(guard.navigate(path, "/").await, NavigationOutcome::Allow, "{}", path);
        }
        assert!(!api.calls().contains(&"verify"));
        assert!(!api.calls().contains(&"aggregation"));
    }

    #[tokio::test]
    async fn test_auth_disabled_still_checks_capability() {
        let (guard, _, _) = guard_with(MockApi::new(false).aggregation(Reply::Ok(false)));

        let outcome = guard.navigate("/subscription-aggregation", "/").await;

        assert_eq!(outcome, NavigationOutcome::redirect("/subscriptions"));
    }

    #[tokio::test]
    async fn test_auth_disabled_passes_stored_token_to_feature_check() {
        let (guard, api, store) = guard_with(MockApi::new(false));
        logged_in(&store).await;

        guard.navigate("/subscription-aggregation", "/").await;

        let seen = api.seen_tokens.lock().unwrap().clone();
        assert_eq!(seen, vec![Some("jwt-token".to_string())]);
    }

    // ===== Auth status failure =====

    #[tokio::test]
    #[traced_test]
    async fn test_auth_status_failure_fails_open() {
        let (guard, api, _) = guard_with(MockApi::new(true).auth(Reply::Fail(transport())));

        let outcome = guard.navigate("/subscription-aggregation", "/").await;

        assert_eq!(outcome, NavigationOutcome::Allow);
        assert_eq!(api.calls(), vec!["status"]);
        assert!(logs_contain("failed to check auth status"));
    }

    #[tokio::test]
    async fn test_auth_status_failure_deny_policy_redirects_to_login() {
        let (guard, _, _) = guard_with(MockApi::new(true).auth(Reply::Fail(transport())));
        let guard = guard.with_policy(GuardPolicy {
            auth_status: FailurePolicy::Deny,
            ..GuardPolicy::default()
        });

        let outcome = guard.navigate("/rules", "/").await;

        assert_eq!(outcome, NavigationOutcome::redirect("/login"));
    }

    // ===== Auth enabled =====

    #[tokio::test]
    async fn test_missing_token_redirects_to_login_for_every_route() {
        let (guard, api, _) = guard_with(MockApi::new(true));

        for path in VIEW_PATHS.iter().chain(["/subscription-aggregation"].iter()) {
            assert_eq!(
                guard.navigate(path, "/").await,
                NavigationOutcome::redirect("/login"),
                "{}",
                path
            );
        }
        assert!(!api.calls().contains(&"verify"));
    }

    #[tokio::test]
    async fn test_valid_token_allows() {
        let (guard, api, store) = guard_with(MockApi::new(true));
        logged_in(&store).await;

        let outcome = guard.navigate("/agents", "/dashboard").await;

        assert_eq!(outcome, NavigationOutcome::Allow);
        assert_eq!(api.calls(), vec!["status", "verify"]);
        assert_eq!(store.get(TOKEN_KEY).await.unwrap().as_deref(), Some("jwt-token"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_rejected_token_clears_session() {
        let (guard, _, store) = guard_with(MockApi::new(true).verify(Reply::Fail(unauthorized())));
        logged_in(&store).await;
        store.set(FEATURE_CACHE_KEY, "true").await.unwrap();

        let outcome = guard.navigate("/nodes", "/").await;

        assert_eq!(outcome, NavigationOutcome::redirect("/login"));
        assert!(store.get(TOKEN_KEY).await.unwrap().is_none());
        assert!(store.get(USERNAME_KEY).await.unwrap().is_none());
        assert_eq!(store.get(FEATURE_CACHE_KEY).await.unwrap().as_deref(), Some("true"));
        assert!(logs_contain("session token verification failed"));
    }

    #[tokio::test]
    async fn test_verify_transport_failure_treated_as_invalid() {
        let (guard, _, store) = guard_with(MockApi::new(true).verify(Reply::Fail(transport())));
        logged_in(&store).await;

        let outcome = guard.navigate("/rules", "/").await;

        assert_eq!(outcome, NavigationOutcome::redirect("/login"));
        assert!(store.get(TOKEN_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify_allow_policy_only_covers_transport_failures() {
        let policy = GuardPolicy {
            verify: FailurePolicy::Allow,
            ..GuardPolicy::default()
        };

        let (guard, _, store) = guard_with(MockApi::new(true).verify(Reply::Fail(transport())));
        let guard = guard.with_policy(policy);
        logged_in(&store).await;
        assert_eq!(guard.navigate("/rules", "/").await, NavigationOutcome::Allow);

        let (guard, _, store) = guard_with(MockApi::new(true).verify(Reply::Fail(unauthorized())));
        let guard = guard.with_policy(policy);
        logged_in(&store).await;
        assert_eq!(
            guard.navigate("/rules", "/").await,
            NavigationOutcome::redirect("/login")
        );
    }

    // ===== Subscription aggregation capability =====

    #[tokio::test]
    #[traced_test]
    async fn test_feature_disabled_redirects_even_when_authenticated() {
        let (guard, _, store) = guard_with(MockApi::new(true).aggregation(Reply::Ok(false)));
        logged_in(&store).await;

        let outcome = guard.navigate("/subscription-aggregation", "/").await;

        assert_eq!(outcome, NavigationOutcome::redirect("/subscriptions"));
        assert!(logs_contain("subscription-aggregation is not enabled"));
    }

    #[tokio::test]
    async fn test_feature_enabled_allows_and_refreshes_cache() {
        let (guard, _, store) = guard_with(MockApi::new(true));
        logged_in(&store).await;

        let outcome = guard.navigate("/subscription-aggregation", "/").await;

        assert_eq!(outcome, NavigationOutcome::Allow);
        assert_eq!(store.get(FEATURE_CACHE_KEY).await.unwrap().as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_feature_check_failure_without_cache_fails_closed() {
        let (guard, _, _) = guard_with(MockApi::new(false).aggregation(Reply::Fail(transport())));

        let outcome = guard.navigate("/subscription-aggregation", "/").await;

        assert_eq!(outcome, NavigationOutcome::redirect("/subscriptions"));
    }

    #[tokio::test]
    async fn test_feature_check_failure_uses_cached_true() {
        let (guard, _, store) = guard_with(MockApi::new(true).aggregation(Reply::Fail(transport())));
        logged_in(&store).await;
        store.set(FEATURE_CACHE_KEY, "true").await.unwrap();

        let outcome = guard.navigate("/subscription-aggregation", "/").await;

        assert_eq!(outcome, NavigationOutcome::Allow);
    }

    #[tokio::test]
    async fn test_feature_check_failure_with_cached_false() {
        let (guard, _, store) = guard_with(MockApi::new(false).aggregation(Reply::Fail(transport())));
        store.set(FEATURE_CACHE_KEY, "false").await.unwrap();

        let outcome = guard.navigate("/subscription-aggregation", "/").await;

        assert_eq!(outcome, NavigationOutcome::redirect("/subscriptions"));
    }

    #[tokio::test]
    async fn test_feature_check_failure_allow_policy() {
        let (guard, _, _) = guard_with(MockApi::new(false).aggregation(Reply::Fail(transport())));
        let guard = guard.with_policy(GuardPolicy {
            aggregation: FailurePolicy::Allow,
            ..GuardPolicy::default()
        });

        assert_eq!(
            guard.navigate("/subscription-aggregation", "/").await,
            NavigationOutcome::Allow
        );
    }

    #[tokio::test]
    async fn test_feature_not_checked_when_token_invalid() {
        let (guard, api, store) = guard_with(MockApi::new(true).verify(Reply::Fail(unauthorized())));
        logged_in(&store).await;

        guard.navigate("/subscription-aggregation", "/").await;

        assert!(!api.calls().contains(&"aggregation"));
    }

    // ===== Idempotence =====

    #[tokio::test]
    async fn test_repeated_failing_navigation_is_idempotent() {
        let api = Arc::new(MockApi::new(true).verify(Reply::Fail(unauthorized())));
        let store = Arc::new(CountingStore::new());
        store.inner.set(TOKEN_KEY, "stale").await.unwrap();
        store.inner.set(USERNAME_KEY, "admin").await.unwrap();
        let guard = NavigationGuard::new(api.clone(), store.clone());

        let first = guard.navigate("/rules", "/").await;
        let second = guard.navigate("/rules", "/").await;

        assert_eq!(first, NavigationOutcome::redirect("/login"));
        assert_eq!(first, second);
        // one clear_session: token + username removed once
        assert_eq!(store.removes.load(Ordering::SeqCst), 2);
        assert_eq!(store.sets.load(Ordering::SeqCst), 0);
        assert_eq!(api.calls(), vec!["status", "verify", "status"]);
    }

    // ===== Superseded navigations =====

    #[tokio::test]
    async fn test_superseded_run_applies_no_side_effects() {
        let gate = Arc::new(Notify::new());
        let api = MockApi::new(true)
            .verify(Reply::Fail(unauthorized()))
            .gated(gate.clone());
        let (guard, _, store) = guard_with(api);
        let guard = Arc::new(guard);
        logged_in(&store).await;

        let stale = {
            let guard = guard.clone();
            tokio::spawn(async move { guard.navigate("/rules", "/").await })
        };
        tokio::task::yield_now().await;

        // a newer navigation to the login page overtakes the pending one
        assert_eq!(guard.navigate("/login", "/").await, NavigationOutcome::Allow);
        gate.notify_one();

        assert_eq!(stale.await.unwrap(), NavigationOutcome::Superseded);
        assert_eq!(store.get(TOKEN_KEY).await.unwrap().as_deref(), Some("jwt-token"));
        assert_eq!(store.get(USERNAME_KEY).await.unwrap().as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_latest_navigation_still_resolves() {
        let (guard, _, _) = guard_with(MockApi::new(false));

        assert_eq!(guard.navigate("/rules", "/").await, NavigationOutcome::Allow);
        assert_eq!(guard.navigate("/nodes", "/rules").await, NavigationOutcome::Allow);
    }
}

//! dashgate - dashboard navigation guard
//!
//! This is the composition root that wires together all the components.

use dashgate::adapters::inbound::{Cli, Command};
use dashgate::adapters::outbound::{DashMapSessionStore, HttpDashboardApi, SqliteSessionStore};
use dashgate::application::{AuthService, NavigationGuard, SessionState};
use dashgate::config::load_config;
use dashgate::domain::ports::{DashboardApi, SessionStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    tracing::debug!("using backend api at {}", cfg.api_base_url);

    // ===== COMPOSITION ROOT =====

    let api: Arc<dyn DashboardApi> = Arc::new(HttpDashboardApi::new(cfg.http_api())?);

    let store: Arc<dyn SessionStore> = match &cfg.session_db_path {
        Some(path) => {
            tracing::debug!("session store at {}", path);
            Arc::new(SqliteSessionStore::open(path)?)
        }
        None => Arc::new(DashMapSessionStore::new()),
    };

    let guard = Arc::new(
        NavigationGuard::new(api.clone(), store.clone()).with_policy(cfg.guard_policy()),
    );
    let auth = Arc::new(AuthService::new(api, SessionState::new(store)));

    let cli = Cli::new(guard, auth);
    let mut stdout = std::io::stdout();
    cli.run(command, &mut stdout).await
}

//! # quotaswitchd: quotaswitch daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Construct the service registry, resolving firewall credentials from
//!   the environment
//! - Construct adapters and application services, injecting adapters via
//!   port traits
//! - Start the quota ticker
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT), stopping the ticker
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use quotaswitch_adapter_hetzner::HetznerFirewallClient;
use quotaswitch_adapter_http_axum::state::AppState;
use quotaswitch_adapter_prometheus::PrometheusMetrics;
use quotaswitch_app::registry::ServiceRegistry;
use quotaswitch_app::services::auth_service::AuthService;
use quotaswitch_app::services::control_service::ControlService;
use quotaswitch_app::ticker::QuotaTicker;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();
    for warning in config.warnings() {
        tracing::warn!("{warning}");
    }

    // Registry
    let services = config.build_services(|key| std::env::var(key).ok())?;
    let registry = Arc::new(ServiceRegistry::new(services)?);

    // Adapters
    let metrics = Arc::new(PrometheusMetrics::new()?);
    let backend = HetznerFirewallClient::new(config.firewall.clone())?;

    // Services
    let control = Arc::new(ControlService::new(
        Arc::clone(&registry),
        backend,
        Arc::clone(&metrics),
    ));
    let auth = AuthService::new(config.api_token()?, Arc::clone(&metrics));

    // Ticker
    let cancel = CancellationToken::new();
    let ticker = QuotaTicker::new(
        Arc::clone(&control),
        config.tick_interval(),
        config.reset_schedule()?,
    )
    .spawn(cancel.clone());

    // HTTP
    let state = AppState::new(control, auth, metrics);
    let app = quotaswitch_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        %bind_addr,
        services = registry.len(),
        "quotaswitchd listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    ticker.await?;
    tracing::info!("quotaswitchd stopped");

    Ok(())
}

/// Resolve when the process receives SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

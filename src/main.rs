//! FlowFi events server.
//!
//! Serves `GET /events/subscribe` and friends. Publishers embed the library
//! and push through [`flowfi_events::adapters::Broadcaster`].

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use flowfi_events::adapters::http::{router, EventsAppState, HealthState};
use flowfi_events::adapters::sse::{ClientRegistry, ConnectionManager};
use flowfi_events::config::AppConfig;
use flowfi_events::domain::foundation::Timestamp;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config)?;
    config.validate()?;

    let registry = Arc::new(ClientRegistry::new(config.events.max_connections));
    let connections = Arc::new(ConnectionManager::new(
        registry.clone(),
        config.events.connection_settings(),
    ));

    let app = router(
        EventsAppState::new(connections),
        HealthState::new(Timestamp::now()),
        &config.server,
    );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        max_connections = config.events.max_connections,
        "FlowFi events server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(registry.clone()))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured level. JSON lines in production.
fn init_tracing(config: &AppConfig) -> Result<(), BoxError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.is_production() {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

/// Resolves on Ctrl-C, closing every event stream so in-flight responses end.
async fn shutdown_signal(registry: Arc<ClientRegistry>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }
    registry.drain();
}

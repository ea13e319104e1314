//! GatePass Server
//!
//! This binary:
//! - Loads configuration from the environment (and `.env`)
//! - Connects to `PostgreSQL` and runs migrations
//! - Starts the Prometheus exporter
//! - Serves the HTTP API until Ctrl+C
//!
//! # Usage
//!
//! ```bash
//! GATEPASS_CREDENTIAL_SECRET=... DATABASE_URL=postgres://... cargo run --bin server
//! ```

use gatepass_core::notify::DisabledNotifier;
use gatepass_core::{CredentialCodec, Notifier, SystemClock};
use gatepass_postgres::PostgresRegistrationStore;
use gatepass_web::{AppState, Config, ConsoleNotifier, build_router, metrics};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gatepass_core=debug,gatepass_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🎫 Starting GatePass server...");

    let config = Config::from_env()?;
    tracing::info!(
        mode = %config.mode,
        server = %config.server_addr(),
        metrics = %config.metrics_addr(),
        notifications = config.notifications_enabled,
        "Configuration loaded"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .min_connections(config.postgres.min_connections)
        .acquire_timeout(Duration::from_secs(config.postgres.connect_timeout))
        .idle_timeout(Duration::from_secs(config.postgres.idle_timeout))
        .connect(&config.postgres.url)
        .await?;

    let store = PostgresRegistrationStore::new(pool);
    store.migrate().await?;
    tracing::info!("✓ Database ready");

    metrics::install_exporter(&config.metrics_addr())?;

    let codec = CredentialCodec::new(
        &config.credentials.secret,
        chrono::Duration::days(config.credentials.ttl_days),
    );
    let notifier: Arc<dyn Notifier> = if config.notifications_enabled {
        Arc::new(ConsoleNotifier::new())
    } else {
        DisabledNotifier::shared()
    };

    let state = AppState::new(
        Arc::new(store),
        Arc::new(codec),
        notifier,
        Arc::new(SystemClock),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.server_addr()).await?;
    tracing::info!(addr = %config.server_addr(), "🎫 GatePass server is running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down...");
}

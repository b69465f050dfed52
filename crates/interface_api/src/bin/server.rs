//! Freight billing API server
//!
//! Configuration comes from `API_`-prefixed environment variables (and a
//! local `.env` file if present); see `ApiConfig` for the knobs. On startup
//! the binary runs the schema migrations, wires the PostgreSQL store
//! adapters into the router, and serves until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_db::{
    create_pool_from_url, PgCustomerStore, PgSerialSequence, PgShipmentStore, PgTripStore,
    PgVoucherStore,
};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;
    init_tracing(&config.log_level);

    tracing::info!(host = %config.host, port = config.port, "starting freight billing API");

    let pool = create_pool_from_url(&config.database_url).await?;

    tracing::info!("running database migrations");
    sqlx::migrate!("../infra_db/migrations").run(&pool).await?;

    let state = AppState::new(
        Arc::new(PgShipmentStore::new(pool.clone())),
        Arc::new(PgCustomerStore::new(pool.clone())),
        Arc::new(PgVoucherStore::new(pool.clone())),
        Arc::new(PgTripStore::new(pool.clone())),
        Arc::new(PgSerialSequence::new(pool.clone())),
        Some(pool),
        config.clone(),
    );

    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Resolves on Ctrl+C or SIGTERM so in-flight requests can drain.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }
}

//! Loyalty points backend.
//!
//! HTTP facade over the ledger plus the accrual reconciliation pipeline.

use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use loyalty_core::accrual::{AccrualClient, HttpAccrualClient};
use loyalty_core::auth::AuthConfig;
use loyalty_core::processors::{spawn_reconcile_pipeline, ReconcileConfig};
use loyalty_core::service::Service;
use loyalty_core::storage::{Ledger, PostgresLedger};
use loyalty_core::utils::RateGate;

use loyalty_server::api::build_router;
use loyalty_server::config::Config;
use loyalty_server::server::run_server;
use loyalty_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::parse();
    tracing::info!("Starting loyalty-server v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_uri)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;

    sqlx::migrate!("../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            e
        })?;
    tracing::info!("Database ready");

    let ledger: Arc<dyn Ledger> = Arc::new(PostgresLedger::new(db_pool.clone()));
    let client: Arc<dyn AccrualClient> = Arc::new(
        HttpAccrualClient::new(config.accrual_system_address.clone()).map_err(|e| {
            tracing::error!("Failed to build accrual client: {}", e);
            e
        })?,
    );
    let gate = Arc::new(RateGate::new());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let pipeline_handles = spawn_reconcile_pipeline(
        ledger.clone(),
        client,
        gate,
        ReconcileConfig {
            poll_interval: config.accrual_poll_interval,
            worker_count: config.accrual_workers,
            queue_capacity: config.accrual_queue_capacity,
        },
        shutdown_rx,
    );

    let auth = AuthConfig {
        jwt_secret: config.jwt_secret.clone(),
        token_ttl: config.jwt_exp,
    };
    let service = Arc::new(Service::new(ledger, auth.clone()));
    let router = build_router(AppState::new(service, auth));

    let result = run_server(router, &config.run_address).await;

    // --- Graceful shutdown sequence ---

    tracing::info!("Signaling reconciliation pipeline to shut down...");
    let _ = shutdown_tx.send(true);

    for handle in pipeline_handles {
        let _ = handle.await;
    }
    tracing::info!("Reconciliation pipeline shut down");

    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

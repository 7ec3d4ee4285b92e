//! API server entry point.

use std::sync::Arc;

use api::config::{Config, LogFormat};
use api::routes::orders::AppState;
use ledger::{InMemoryLedgerStore, LedgerStore, PostgresLedgerStore};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve<S, L>(
    config: &Config,
    state: Arc<AppState<S, L>>,
    metrics_handle: PrometheusHandle,
    storage: &'static str,
) where
    S: OrderStore + 'static,
    L: LedgerStore + 'static,
{
    let app = api::create_app(state, metrics_handle, storage);

    let addr = config.addr();
    tracing::info!(%addr, storage, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Pick the store backend and serve
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(url)
                .await
                .expect("failed to connect to database");

            let store = PostgresOrderStore::new(pool.clone());
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            let ledger = PostgresLedgerStore::new(pool.clone());

            let state = api::create_state(store, ledger, &config);
            serve(&config, state, metrics_handle, api::STORAGE_POSTGRES).await;
            pool.close().await;
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory stores");
            let store = InMemoryOrderStore::new();
            for &(product_id, quantity) in &config.seed_inventory {
                store.set_inventory(product_id, quantity).await;
            }
            if config.seed_inventory.is_empty() {
                tracing::warn!(
                    "SEED_INVENTORY not set, every product is out of stock and orders with items will be rejected"
                );
            } else {
                tracing::info!(
                    products = config.seed_inventory.len(),
                    "seeded in-memory inventory"
                );
            }

            let state = api::create_state(store, InMemoryLedgerStore::new(), &config);
            serve(&config, state, metrics_handle, api::STORAGE_IN_MEMORY).await;
        }
    }

    tracing::info!("server shut down gracefully");
}

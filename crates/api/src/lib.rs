//! HTTP API server for order placement.
//!
//! Exposes placement, lookup and status endpoints over the checkout
//! services, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use checkout::{
    InMemoryPaymentGateway, LogNotifier, OrderPlacement, OrderQueries, StatusTransitions,
};
use ledger::LedgerStore;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::orders::AppState;

/// Storage backend label for PostgreSQL-backed instances.
pub const STORAGE_POSTGRES: &str = "postgres";

/// Storage backend label for in-memory instances.
pub const STORAGE_IN_MEMORY: &str = "in-memory";

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, L>(
    state: Arc<AppState<S, L>>,
    metrics_handle: PrometheusHandle,
    storage: &'static str,
) -> Router
where
    S: OrderStore + 'static,
    L: LedgerStore + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    let health_router = Router::new()
        .route("/health", get(routes::health::check))
        .with_state(storage);

    Router::new()
        .route("/orders", post(routes::orders::place::<S, L>))
        .route("/orders/{id}", get(routes::orders::get::<S, L>))
        .route(
            "/orders/{id}/status",
            put(routes::orders::update_status::<S, L>),
        )
        .route(
            "/users/{id}/orders",
            get(routes::orders::list_by_user::<S, L>),
        )
        .with_state(state)
        .merge(health_router)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the checkout services over the given stores.
///
/// Payment runs against the simulated in-memory gateway and confirmations
/// are written to the log.
pub fn create_state<S, L>(store: S, ledger: L, config: &Config) -> Arc<AppState<S, L>>
where
    S: OrderStore + Clone + 'static,
    L: LedgerStore + 'static,
{
    let payment = InMemoryPaymentGateway::new();
    payment.set_latency(config.payment_latency);

    let placement = OrderPlacement::new(store.clone(), ledger, payment, LogNotifier)
        .with_config(config.placement());

    Arc::new(AppState {
        placement,
        queries: OrderQueries::new(store.clone()),
        statuses: StatusTransitions::new(store),
    })
}

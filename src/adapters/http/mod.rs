//! HTTP Adapter - Dashboard API Surface
//!
//! Axum router over the dashboard session: source uploads, table
//! queries, overrides, settings, fee tables, CSV export, chat, and
//! the liveness/readiness/metrics endpoints.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tokio::sync::{watch, RwLock};

use crate::adapters::metrics::MetricsRegistry;
use crate::adapters::persistence::{OverrideSnapshotStore, SettingsStore};
use crate::ports::analyst::Analyst;
use crate::usecases::dashboard::Dashboard;

pub use error::ApiError;

/// Shared state behind every handler.
pub struct ApiContext {
    /// The seller session. One writer at a time; merges are quick and
    /// run under the write lock.
    pub dashboard: RwLock<Dashboard>,
    /// Chat backend, absent when unconfigured.
    pub analyst: Option<Arc<dyn Analyst>>,
    pub metrics: MetricsRegistry,
    pub settings_store: SettingsStore,
    pub overrides_store: OverrideSnapshotStore,
    /// Readiness flag flipped off during graceful shutdown.
    pub health_rx: watch::Receiver<bool>,
    pub best_seller_limit: usize,
    pub summary_limit: usize,
}

pub type AppState = Arc<ApiContext>;

/// Builds the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/live", get(handlers::live))
        .route("/ready", get(handlers::ready))
        .route("/metrics", get(handlers::metrics))
        .route("/api/sources/:kind", post(handlers::upload_source))
        .route("/api/products", get(handlers::products))
        .route("/api/stats", get(handlers::stats))
        .route("/api/charts", get(handlers::charts))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .route("/api/overrides/:sku", put(handlers::set_override))
        .route("/api/fees/:sku", get(handlers::fee_detail))
        .route(
            "/api/fee-tables/:variant",
            get(handlers::get_fee_table).put(handlers::update_fee_table),
        )
        .route("/api/export", get(handlers::export))
        .route("/api/chat", post(handlers::chat))
        .with_state(state)
}

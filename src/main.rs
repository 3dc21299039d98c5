//! Profit Dashboard — Entry Point
//!
//! Initializes configuration, logging, persistence, and the dashboard
//! API server. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate (missing file = defaults)
//! 2. Init tracing (JSON structured logging)
//! 3. Create the Prometheus metrics registry
//! 4. Open the settings/overrides snapshot stores + hydrate state
//! 5. Build the dashboard session (merger, registry, override store)
//! 6. Wire the chat analyst if TEXTGEN_API_KEY is present
//! 7. Serve the axum API with a readiness flag
//! 8. Wait for SIGINT → graceful shutdown (drain → flush snapshots)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

mod adapters;
mod config;
mod domain;
mod ports;
mod usecases;

use adapters::ai::TextGenClient;
use adapters::http::{self, ApiContext};
use adapters::metrics::MetricsRegistry;
use adapters::persistence::{MemoryOverrideStore, OverrideSnapshotStore, SettingsStore};
use config::UserSettings;
use ports::analyst::Analyst;
use usecases::dashboard::Dashboard;
use usecases::merger::Merger;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let app_config =
        config::loader::load_config("config.toml").context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&app_config.server.log_level)
            }),
        )
        .json()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        bind = %app_config.server.bind_address,
        "Starting profit dashboard"
    );

    // ── 3. Metrics registry ─────────────────────────────────
    let metrics = MetricsRegistry::new().context("Failed to register metrics")?;

    // ── 4. Persistence + hydration ──────────────────────────
    let settings_store = SettingsStore::new(&app_config.persistence.data_dir)
        .await
        .context("Failed to open settings store")?;
    let overrides_store = OverrideSnapshotStore::new(&app_config.persistence.data_dir)
        .await
        .context("Failed to open overrides store")?;

    let settings = match settings_store.load().await {
        Ok(Some(saved)) => saved,
        Ok(None) => UserSettings::from(&app_config.dashboard),
        Err(e) => {
            warn!(error = %e, "Settings snapshot unreadable, using config defaults");
            UserSettings::from(&app_config.dashboard)
        }
    };

    let overrides = match overrides_store.load().await {
        Ok(Some(saved)) => MemoryOverrideStore::from_entries(saved),
        Ok(None) => MemoryOverrideStore::new(),
        Err(e) => {
            warn!(error = %e, "Override snapshot unreadable, starting empty");
            MemoryOverrideStore::new()
        }
    };

    // ── 5. Dashboard session ────────────────────────────────
    let merger = Merger::new(app_config.fees.calculator());
    let dashboard = Dashboard::new(settings, merger, Box::new(overrides));

    // ── 6. Chat analyst (optional) ──────────────────────────
    let analyst: Option<Arc<dyn Analyst>> = TextGenClient::from_env(&app_config.ai)
        .context("Failed to build text-generation client")?
        .map(|client| Arc::new(client) as Arc<dyn Analyst>);
    if analyst.is_some() {
        info!(model = %app_config.ai.model, "Chat assistant wired");
    }

    // ── 7. API server ───────────────────────────────────────
    let (health_tx, health_rx) = watch::channel(true);

    let state = Arc::new(ApiContext {
        dashboard: RwLock::new(dashboard),
        analyst,
        metrics,
        settings_store,
        overrides_store,
        health_rx,
        best_seller_limit: app_config.dashboard.best_seller_limit,
        summary_limit: app_config.ai.summary_limit,
    });

    let app = http::router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&app_config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", app_config.server.bind_address))?;
    info!(address = %app_config.server.bind_address, "API server listening");

    // ── 8. Serve until SIGINT, then drain and flush ─────────
    let shutdown = async move {
        let _ = signal::ctrl_c().await;
        info!("SIGINT received, initiating graceful shutdown");
        // Readiness probe flips to 503 while connections drain.
        let _ = health_tx.send(false);
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("API server failed")?;

    // Final snapshot flush so category choices and settings survive
    // the restart.
    let dashboard = state.dashboard.read().await;
    let settings = *dashboard.settings();
    let entries = dashboard.override_entries();
    drop(dashboard);

    if let Err(e) = state.settings_store.save(&settings).await {
        warn!(error = %e, "Failed to flush settings snapshot");
    }
    if let Err(e) = state.overrides_store.save(&entries).await {
        warn!(error = %e, "Failed to flush override snapshot");
    }

    info!("Shutdown complete");
    Ok(())
}

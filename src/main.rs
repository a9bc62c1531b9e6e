// =============================================================================
// Signal Desk — Main Entry Point
// =============================================================================
//
// Generates a synthetic technical-indicator batch for the configured symbol
// universe at startup, then serves it over the REST API. Refreshes are
// manual (POST /api/v1/refresh) unless auto_refresh_secs is set.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod runtime_config;
mod sampler;
mod signals;
mod sort;
mod stats;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::RuntimeConfig;

const CONFIG_PATH: &str = "runtime_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║              Signal Desk — Starting Up                  ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Restrict the universe from env if requested.
    if let Ok(syms) = std::env::var("SIGNAL_DESK_SYMBOLS") {
        let symbols: Vec<String> = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !symbols.is_empty() {
            config.restrict_universe(&symbols);
        }
    }

    info!(
        universe = config.universe.len(),
        refresh_delay_ms = config.refresh_delay_ms,
        auto_refresh_secs = config.auto_refresh_secs,
        "Configured symbol universe"
    );

    // ── 2. Build shared state & initial batch ────────────────────────────
    let state = Arc::new(AppState::new(config));
    let count = state.generate_now();
    info!(count, "Initial record batch generated");

    // ── 3. Auto-refresh loop (optional) ──────────────────────────────────
    let auto_refresh_secs = state.runtime_config.read().auto_refresh_secs;
    if auto_refresh_secs > 0 {
        let refresh_state = state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(
                auto_refresh_secs,
            ));
            // First tick fires immediately; skip it, the initial batch is fresh.
            interval.tick().await;
            loop {
                interval.tick().await;
                if !refresh_state.refresh().await {
                    warn!("auto-refresh skipped — a refresh was already in flight");
                }
            }
        });
        info!(auto_refresh_secs, "Auto-refresh loop launched");
    }

    // ── 4. Start the API server ──────────────────────────────────────────
    let api_state = state.clone();
    let bind_addr =
        std::env::var("SIGNAL_DESK_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());

    let app = api::rest::router(api_state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "API server listening");

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "API server failed");
        }
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");
    server.abort();

    if let Err(e) = state.runtime_config.read().save(CONFIG_PATH) {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("Signal Desk shut down complete.");
    Ok(())
}

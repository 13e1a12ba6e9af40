//! SafeRoom Monitor: Binary Entrypoint
//! Starts the feed pollers and the Axum server that exposes them to the dashboard UI.

use std::sync::Arc;

use anyhow::Context;
use saferoom_monitor::{
    api, feed::fetcher::HttpFetcher, metrics::Metrics, preferences::PreferenceStore, AppState,
    Dashboard, MonitorConfig,
};
use tracing::info;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("ctrl-c handler: {e:#}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    saferoom_monitor::init_tracing();

    let cfg = MonitorConfig::load_default().context("loading monitor config")?;
    let metrics = Metrics::init()?;

    let fetcher = HttpFetcher::new(cfg.request_timeout()).context("building http client")?;
    let preferences = Arc::new(PreferenceStore::load(&cfg.preferences_path));
    let dashboard = Arc::new(Dashboard::start(&cfg, Arc::new(fetcher)));

    let state = AppState::new(
        Arc::clone(&dashboard),
        preferences,
        Arc::new(cfg.clone()),
    );
    let app = api::router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    info!(
        target: "api",
        addr = %cfg.bind_addr,
        backend = %cfg.backend_url,
        "monitor listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    dashboard.stop();
    info!(target: "api", "monitor stopped");
    Ok(())
}

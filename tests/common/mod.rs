// tests/common/mod.rs
//
// In-process stand-in for the inference backend plus helpers to build a
// dashboard against it.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::json;

use saferoom_monitor::config::monitor::{MonitorConfig, PollIntervals};
use saferoom_monitor::feed::fetcher::HttpFetcher;
use saferoom_monitor::Dashboard;

pub const HOUR_MS: u64 = 3_600_000;

/// 24 snapshots at 13:00..13:23 plus one at 14:30:22.
pub fn activity_names() -> Vec<String> {
    let mut names: Vec<String> = (0..24)
        .map(|m| format!("20250615-13{m:02}22-cam0.jpg"))
        .collect();
    names.push("20250615-143022-xyz.jpg".to_string());
    names
}

pub async fn spawn_backend() -> (String, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route(
            "/predict/activity/list",
            get(|| async { Json(activity_names()) }),
        )
        .route(
            "/predict/analytics/summary",
            get(|| async { r#"{"2025-05-30T21:46:00": 2, "2025-05-30T21:45:00": 5}"# }),
        )
        .route(
            "/predict/analytics/errors",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model offline") }),
        )
        .route(
            "/predict/analytics/heatmap",
            get(|| async {
                Json(json!([
                    {"hour": 0, "count": 1, "intensity": 0.25},
                    {"hour": 1, "count": 3, "intensity": 0.75}
                ]))
            }),
        )
        .route(
            "/predict/analytics/snapshots",
            get(|| async { "definitely not json" }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let address = listener.local_addr().expect("local addr should exist");
    let join_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server should run");
    });
    (format!("http://{address}"), join_handle)
}

/// Config pointing at `backend` with intervals long enough that only the
/// initial fetch happens during a test.
pub fn test_config(backend: &str, prefs: &std::path::Path) -> MonitorConfig {
    MonitorConfig {
        backend_url: backend.to_string(),
        preferences_path: prefs.to_path_buf(),
        intervals: PollIntervals {
            activity_ms: HOUR_MS,
            summary_ms: HOUR_MS,
            errors_ms: HOUR_MS,
            heatmap_ms: HOUR_MS,
            snapshots_ms: HOUR_MS,
        },
        ..MonitorConfig::default()
    }
}

pub fn start_dashboard(cfg: &MonitorConfig) -> Arc<Dashboard> {
    let fetcher = HttpFetcher::new(cfg.request_timeout()).expect("http client");
    Arc::new(Dashboard::start(cfg, Arc::new(fetcher)))
}

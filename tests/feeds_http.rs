// tests/feeds_http.rs
//
// Every feed against a live (in-process) backend over real HTTP.

mod common;

use saferoom_monitor::feed::catalog;
use saferoom_monitor::FetchState;

#[tokio::test]
async fn initial_fetch_populates_or_falls_back_per_feed() {
    let (base, server) = common::spawn_backend().await;
    let tmp = tempfile::tempdir().unwrap();
    let cfg = common::test_config(&base, &tmp.path().join("prefs.json"));
    let dashboard = common::start_dashboard(&cfg);

    let snap = dashboard.settled().await;

    // Success: record count equals payload length.
    assert!(matches!(snap.activity, FetchState::Ready { .. }));
    assert_eq!(snap.activity.records().len(), 25);
    assert_eq!(snap.heatmap.records().len(), 2);

    // Mapping payload keeps backend order.
    let times: Vec<_> = snap.summary.records().iter().map(|p| p.time.as_str()).collect();
    assert_eq!(times, vec!["2025-05-30T21:46:00", "2025-05-30T21:45:00"]);

    // Non-2xx: fallback (empty) plus a message.
    assert!(snap.errors.is_error());
    assert!(snap.errors.records().is_empty());
    assert!(snap.errors.error_message().unwrap().contains("500"));

    // Malformed body: exact fallback dataset.
    assert!(snap.snapshots.is_error());
    assert_eq!(snap.snapshots.records(), catalog::snapshots_fallback().as_slice());

    assert!(snap.degraded());
    assert_eq!(snap.live_video_url, format!("{base}/predict/video"));

    dashboard.stop();
    server.abort();
}

#[tokio::test]
async fn unreachable_backend_uses_fallbacks_everywhere() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let tmp = tempfile::tempdir().unwrap();
    let cfg = common::test_config(&format!("http://{addr}"), &tmp.path().join("p.json"));
    let dashboard = common::start_dashboard(&cfg);

    let snap = dashboard.settled().await;
    assert!(snap.summary.is_error());
    assert_eq!(snap.summary.records(), catalog::summary_fallback().as_slice());
    assert_eq!(snap.heatmap.records(), catalog::heatmap_fallback().as_slice());
    assert!(snap.activity.is_error());
    assert!(snap.activity.records().is_empty());

    dashboard.stop();
}

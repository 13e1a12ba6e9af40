// tests/metrics_feed.rs
//
// Own test binary: installs the global recorder exactly once.

mod common;

use metrics_exporter_prometheus::PrometheusBuilder;

#[tokio::test]
async fn feed_series_exposed_after_polling() {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("recorder");

    let (base, server) = common::spawn_backend().await;
    let tmp = tempfile::tempdir().unwrap();
    let cfg = common::test_config(&base, &tmp.path().join("prefs.json"));
    let dashboard = common::start_dashboard(&cfg);
    dashboard.settled().await;

    let out = handle.render();
    for needle in [
        "feed_fetch_total",
        "feed_fetch_errors_total",
        "feed_fetch_ms",
        "feed_last_success_ts",
    ] {
        assert!(out.contains(needle), "metrics exposition missing '{needle}'\n{out}");
    }
    assert!(out.contains(r#"feed="errors""#));

    dashboard.stop();
    server.abort();
}

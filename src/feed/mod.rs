// src/feed/mod.rs
pub mod catalog;
pub mod fetcher;
pub mod normalize;
pub mod poller;
pub mod types;

use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

use crate::feed::fetcher::{FeedFetcher, FetchError};
use crate::feed::types::FeedSource;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_fetch_total", "Fetch cycles issued per feed.");
        describe_counter!(
            "feed_fetch_errors_total",
            "Fetch cycles that ended in transport, status or payload errors."
        );
        describe_counter!(
            "feed_stale_responses_total",
            "Responses discarded because a newer cycle or a stop superseded them."
        );
        describe_histogram!("feed_fetch_ms", "Fetch + normalize time in milliseconds.");
        describe_gauge!(
            "feed_last_success_ts",
            "Unix ts of the last successful fetch per feed."
        );
    });
}

/// GET the source URL and normalize the payload. Records metrics and logs
/// failures; the error is returned for the caller to turn into state.
pub async fn fetch_records<T>(
    fetcher: &dyn FeedFetcher,
    source: &FeedSource<T>,
) -> Result<Vec<T>, FetchError> {
    ensure_metrics_described();
    counter!("feed_fetch_total", "feed" => source.name).increment(1);

    let t0 = Instant::now();
    let result = fetch_and_normalize(fetcher, source).await;
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_fetch_ms", "feed" => source.name).record(ms);

    match &result {
        Ok(records) => {
            let now = chrono::Utc::now().timestamp().max(0);
            gauge!("feed_last_success_ts", "feed" => source.name).set(now as f64);
            tracing::debug!(
                target: "feed",
                feed = source.name,
                records = records.len(),
                ms,
                "feed fetched"
            );
        }
        Err(e) => {
            counter!("feed_fetch_errors_total", "feed" => source.name).increment(1);
            tracing::warn!(target: "feed", feed = source.name, url = %source.url, error = %e, "feed fetch failed");
        }
    }
    result
}

async fn fetch_and_normalize<T>(
    fetcher: &dyn FeedFetcher,
    source: &FeedSource<T>,
) -> Result<Vec<T>, FetchError> {
    let payload = fetcher.get_json(&source.url).await?;
    Ok((source.normalize)(payload)?)
}

pub(crate) fn record_stale(feed: &'static str) {
    ensure_metrics_described();
    counter!("feed_stale_responses_total", "feed" => feed).increment(1);
}

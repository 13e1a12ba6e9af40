// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod activity;
pub mod analytics;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod feed;
pub mod metrics;
pub mod preferences;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::monitor::MonitorConfig;
pub use crate::dashboard::{Dashboard, DashboardSnapshot};
pub use crate::feed::poller::{start, Subscription};
pub use crate::feed::types::{FeedSource, FetchState};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to
/// JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("saferoom_monitor=info,feed=info,api=info,prefs=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let (compact, json) = if json {
        (None, Some(fmt::layer().json()))
    } else {
        (Some(fmt::layer().compact()), None)
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(compact)
        .with(json)
        .try_init();
}

// src/dashboard.rs
//! One subscription per backend feed, plus a serializable view of all of them.

use std::sync::Arc;

use serde::Serialize;

use crate::activity::ActivityRecord;
use crate::config::monitor::MonitorConfig;
use crate::feed::catalog::{self, FeedKind};
use crate::feed::fetcher::FeedFetcher;
use crate::feed::poller::{self, Subscription};
use crate::feed::types::{FetchState, HeatmapCell, Snapshot, SummaryPoint};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub live_video_url: String,
    pub activity: FetchState<ActivityRecord>,
    pub summary: FetchState<SummaryPoint>,
    pub errors: FetchState<f64>,
    pub heatmap: FetchState<HeatmapCell>,
    pub snapshots: FetchState<Snapshot>,
}

impl DashboardSnapshot {
    /// True when any feed is showing fallback data.
    pub fn degraded(&self) -> bool {
        self.activity.is_error()
            || self.summary.is_error()
            || self.errors.is_error()
            || self.heatmap.is_error()
            || self.snapshots.is_error()
    }
}

pub struct Dashboard {
    backend_url: String,
    pub activity: Subscription<ActivityRecord>,
    pub summary: Subscription<SummaryPoint>,
    pub errors: Subscription<f64>,
    pub heatmap: Subscription<HeatmapCell>,
    pub snapshots: Subscription<Snapshot>,
}

impl Dashboard {
    /// Start polling every feed. Must be called from within a Tokio runtime.
    pub fn start(cfg: &MonitorConfig, fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self {
            backend_url: cfg.backend_url.clone(),
            activity: poller::start(catalog::activity_source(cfg), Arc::clone(&fetcher)),
            summary: poller::start(catalog::summary_source(cfg), Arc::clone(&fetcher)),
            errors: poller::start(catalog::errors_source(cfg), Arc::clone(&fetcher)),
            heatmap: poller::start(catalog::heatmap_source(cfg), Arc::clone(&fetcher)),
            snapshots: poller::start(catalog::snapshots_source(cfg), fetcher),
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            live_video_url: catalog::live_video_url(&self.backend_url),
            activity: self.activity.state(),
            summary: self.summary.state(),
            errors: self.errors.state(),
            heatmap: self.heatmap.state(),
            snapshots: self.snapshots.state(),
        }
    }

    /// Wait until every feed has completed its first cycle.
    pub async fn settled(&self) -> DashboardSnapshot {
        let (activity, summary, errors, heatmap, snapshots) = tokio::join!(
            self.activity.settled(),
            self.summary.settled(),
            self.errors.settled(),
            self.heatmap.settled(),
            self.snapshots.settled(),
        );
        DashboardSnapshot {
            live_video_url: catalog::live_video_url(&self.backend_url),
            activity,
            summary,
            errors,
            heatmap,
            snapshots,
        }
    }

    /// Run one out-of-band fetch cycle for `kind`; returns its resulting status.
    pub async fn refresh(&self, kind: FeedKind) -> &'static str {
        match kind {
            FeedKind::Activity => {
                self.activity.refresh().await;
                self.activity.state().status()
            }
            FeedKind::Summary => {
                self.summary.refresh().await;
                self.summary.state().status()
            }
            FeedKind::Errors => {
                self.errors.refresh().await;
                self.errors.state().status()
            }
            FeedKind::Heatmap => {
                self.heatmap.refresh().await;
                self.heatmap.state().status()
            }
            FeedKind::Snapshots => {
                self.snapshots.refresh().await;
                self.snapshots.state().status()
            }
        }
    }

    pub fn stop(&self) {
        self.activity.stop();
        self.summary.stop();
        self.errors.stop();
        self.heatmap.stop();
        self.snapshots.stop();
    }
}

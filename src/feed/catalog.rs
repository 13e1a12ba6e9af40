// src/feed/catalog.rs
//! Backend endpoints and the configured feed sources built from them.

use std::fmt;
use std::str::FromStr;

use reqwest::Url;

use crate::activity::{self, ActivityRecord};
use crate::config::monitor::MonitorConfig;
use crate::feed::normalize;
use crate::feed::types::{FeedSource, HeatmapCell, Snapshot, SnapshotId, SummaryPoint};

pub const LIVE_VIDEO_PATH: &str = "/predict/video";
pub const ACTIVITY_IMAGE_PATH: &str = "/predict/activity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Activity,
    Summary,
    Errors,
    Heatmap,
    Snapshots,
}

impl FeedKind {
    pub const ALL: [FeedKind; 5] = [
        FeedKind::Activity,
        FeedKind::Summary,
        FeedKind::Errors,
        FeedKind::Heatmap,
        FeedKind::Snapshots,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeedKind::Activity => "activity",
            FeedKind::Summary => "summary",
            FeedKind::Errors => "errors",
            FeedKind::Heatmap => "heatmap",
            FeedKind::Snapshots => "snapshots",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            FeedKind::Activity => "/predict/activity/list",
            FeedKind::Summary => "/predict/analytics/summary",
            FeedKind::Errors => "/predict/analytics/errors",
            FeedKind::Heatmap => "/predict/analytics/heatmap",
            FeedKind::Snapshots => "/predict/analytics/snapshots",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feed: {0}")]
pub struct UnknownFeed(pub String);

impl FromStr for FeedKind {
    type Err = UnknownFeed;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFeed(s.to_string()))
    }
}

pub fn endpoint_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

pub fn live_video_url(base: &str) -> String {
    endpoint_url(base, LIVE_VIDEO_PATH)
}

/// Image URL for one activity snapshot; the filename is encoded as a single
/// path segment.
pub fn activity_image_url(base: &str, filename: &str) -> String {
    let raw = endpoint_url(base, ACTIVITY_IMAGE_PATH);
    match Url::parse(&raw) {
        Ok(mut url) => {
            if let Ok(mut segs) = url.path_segments_mut() {
                segs.push(filename);
            }
            url.to_string()
        }
        // Relative base (e.g. same-origin proxy): no encoding available.
        Err(_) => format!("{raw}/{filename}"),
    }
}

fn source<T>(
    cfg: &MonitorConfig,
    kind: FeedKind,
    interval_ms: u64,
    normalize: crate::feed::types::Normalizer<T>,
    fallback: Vec<T>,
) -> FeedSource<T> {
    FeedSource {
        name: kind.as_str(),
        url: endpoint_url(&cfg.backend_url, kind.path()),
        poll_interval: std::time::Duration::from_millis(interval_ms),
        normalize,
        fallback,
    }
}

pub fn activity_source(cfg: &MonitorConfig) -> FeedSource<ActivityRecord> {
    source(
        cfg,
        FeedKind::Activity,
        cfg.intervals.activity_ms,
        activity::activity_records,
        Vec::new(),
    )
}

pub fn summary_source(cfg: &MonitorConfig) -> FeedSource<SummaryPoint> {
    source(
        cfg,
        FeedKind::Summary,
        cfg.intervals.summary_ms,
        normalize::summary_points,
        summary_fallback(),
    )
}

pub fn errors_source(cfg: &MonitorConfig) -> FeedSource<f64> {
    source(
        cfg,
        FeedKind::Errors,
        cfg.intervals.errors_ms,
        normalize::reconstruction_errors,
        Vec::new(),
    )
}

pub fn heatmap_source(cfg: &MonitorConfig) -> FeedSource<HeatmapCell> {
    source(
        cfg,
        FeedKind::Heatmap,
        cfg.intervals.heatmap_ms,
        normalize::records_of::<HeatmapCell>,
        heatmap_fallback(),
    )
}

pub fn snapshots_source(cfg: &MonitorConfig) -> FeedSource<Snapshot> {
    source(
        cfg,
        FeedKind::Snapshots,
        cfg.intervals.snapshots_ms,
        normalize::records_of::<Snapshot>,
        snapshots_fallback(),
    )
}

pub fn summary_fallback() -> Vec<SummaryPoint> {
    [
        ("9AM", 1),
        ("10AM", 3),
        ("11AM", 2),
        ("12PM", 5),
        ("1PM", 2),
        ("2PM", 4),
    ]
    .into_iter()
    .map(|(time, count)| SummaryPoint {
        time: time.to_string(),
        count,
    })
    .collect()
}

/// 24 hourly cells with a fixed sawtooth of counts 0..=4.
pub fn heatmap_fallback() -> Vec<HeatmapCell> {
    (0u8..24)
        .map(|hour| {
            let count = u64::from(hour % 5);
            HeatmapCell {
                hour,
                count,
                intensity: count as f64 / 4.0,
            }
        })
        .collect()
}

pub fn snapshots_fallback() -> Vec<Snapshot> {
    ["12:01 PM", "12:07 PM", "12:15 PM"]
        .into_iter()
        .enumerate()
        .map(|(i, time)| Snapshot {
            id: SnapshotId::Num(i as u64 + 1),
            time: Some(time.to_string()),
            img: Some(format!("/snap{}.jpg", i + 1)),
            confidence: None,
            kind: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_names_round_trip_through_from_str() {
        for k in FeedKind::ALL {
            assert_eq!(k.as_str().parse::<FeedKind>().unwrap(), k);
        }
        assert!("video".parse::<FeedKind>().is_err());
    }

    #[test]
    fn urls_join_without_double_slash() {
        assert_eq!(
            endpoint_url("http://cam.local:8000/", FeedKind::Summary.path()),
            "http://cam.local:8000/predict/analytics/summary"
        );
        assert_eq!(
            live_video_url("http://cam.local:8000"),
            "http://cam.local:8000/predict/video"
        );
    }

    #[test]
    fn image_url_encodes_filename() {
        assert_eq!(
            activity_image_url("http://cam.local", "20250615-143022 a#1.jpg"),
            "http://cam.local/predict/activity/20250615-143022%20a%231.jpg"
        );
        assert_eq!(
            activity_image_url("", "x.jpg"),
            "/predict/activity/x.jpg"
        );
    }

    #[test]
    fn fallbacks_are_deterministic() {
        assert_eq!(summary_fallback(), summary_fallback());
        assert_eq!(summary_fallback().len(), 6);
        let hm = heatmap_fallback();
        assert_eq!(hm.len(), 24);
        assert_eq!(hm[4].count, 4);
        assert_eq!(hm[4].intensity, 1.0);
        assert_eq!(hm[5].count, 0);
        assert_eq!(snapshots_fallback()[2].img.as_deref(), Some("/snap3.jpg"));
    }

    #[test]
    fn sources_use_configured_backend_and_intervals() {
        let mut cfg = MonitorConfig::default();
        cfg.backend_url = "http://backend:9000".into();
        cfg.intervals.heatmap_ms = 1234;
        let s = heatmap_source(&cfg);
        assert_eq!(s.name, "heatmap");
        assert_eq!(s.url, "http://backend:9000/predict/analytics/heatmap");
        assert_eq!(s.poll_interval.as_millis(), 1234);
        assert_eq!(s.fallback.len(), 24);
    }
}

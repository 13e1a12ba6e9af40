// src/feed/types.rs
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::normalize::ShapeError;

/// Turns a decoded JSON payload into display-ready records.
pub type Normalizer<T> = fn(serde_json::Value) -> Result<Vec<T>, ShapeError>;

/// One polled endpoint plus its refresh policy and fallback dataset.
#[derive(Clone)]
pub struct FeedSource<T> {
    /// Short name used in logs, metrics and the HTTP API.
    pub name: &'static str,
    pub url: String,
    pub poll_interval: Duration,
    pub normalize: Normalizer<T>,
    /// Shown only when a fetch fails.
    pub fallback: Vec<T>,
}

impl<T> std::fmt::Debug for FeedSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSource")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("poll_interval", &self.poll_interval)
            .field("fallback_len", &self.fallback.len())
            .finish()
    }
}

/// Current state of a single feed. Exactly one variant is current at a time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchState<T> {
    Loading,
    Ready {
        records: Vec<T>,
        fetched_at: DateTime<Utc>,
    },
    Error {
        message: String,
        fallback: Vec<T>,
    },
}

impl<T> FetchState<T> {
    /// Records to display: fresh data when ready, the fallback on error,
    /// nothing while loading.
    pub fn records(&self) -> &[T] {
        match self {
            FetchState::Loading => &[],
            FetchState::Ready { records, .. } => records,
            FetchState::Error { fallback, .. } => fallback,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FetchState::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchState::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            FetchState::Loading => "loading",
            FetchState::Ready { .. } => "ready",
            FetchState::Error { .. } => "error",
        }
    }
}

/// Anomaly count for one time bucket of the analytics summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPoint {
    /// ISO minute timestamp from the backend, or a free label in fallback data.
    pub time: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub hour: u8,
    pub count: u64,
    #[serde(default)]
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotId {
    Num(u64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_follow_the_current_state() {
        let loading: FetchState<u8> = FetchState::Loading;
        assert!(loading.records().is_empty());

        let ready = FetchState::Ready {
            records: vec![1u8, 2],
            fetched_at: Utc::now(),
        };
        assert_eq!(ready.records(), &[1, 2]);
        assert_eq!(ready.error_message(), None);

        let err = FetchState::Error {
            message: "boom".into(),
            fallback: vec![9u8],
        };
        assert_eq!(err.records(), &[9]);
        assert_eq!(err.error_message(), Some("boom"));
        assert_eq!(err.status(), "error");
    }

    #[test]
    fn state_serializes_with_status_tag() {
        let err: FetchState<u8> = FetchState::Error {
            message: "HTTP 500".into(),
            fallback: vec![],
        };
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["message"], "HTTP 500");

        let v = serde_json::to_value(FetchState::<u8>::Loading).unwrap();
        assert_eq!(v["status"], "loading");
    }

    #[test]
    fn snapshot_accepts_numeric_or_text_ids() {
        let s: Snapshot =
            serde_json::from_str(r#"{"id":3,"time":"12:15 PM","type":"fall","confidence":0.8}"#)
                .unwrap();
        assert_eq!(s.id, SnapshotId::Num(3));
        assert_eq!(s.kind.as_deref(), Some("fall"));

        let s: Snapshot = serde_json::from_str(r#"{"id":"a1"}"#).unwrap();
        assert_eq!(s.id, SnapshotId::Text("a1".into()));
        assert!(s.img.is_none());
    }
}

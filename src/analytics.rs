// src/analytics.rs
//! Statistics over the summary and reconstruction-error feeds.

use std::str::FromStr;

use chrono::{DateTime, Duration, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::feed::types::SummaryPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    Low,
    Medium,
    High,
}

impl ErrorCategory {
    pub fn of(value: f64) -> Self {
        if value > 0.5 {
            ErrorCategory::High
        } else if value > 0.2 {
            ErrorCategory::Medium
        } else {
            ErrorCategory::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBucket {
    /// 1-based sample index.
    pub index: usize,
    pub value: f64,
    pub category: ErrorCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_anomalies: u64,
    pub peak_per_minute: u64,
    pub avg_error: f64,
    pub data_points: usize,
    pub error_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub time: String,
    /// `HH:MM` for ISO times, otherwise the raw label.
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    LastHour,
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
}

impl TimeRange {
    pub fn duration(self) -> Duration {
        match self {
            TimeRange::LastHour => Duration::hours(1),
            TimeRange::Last24Hours => Duration::hours(24),
            TimeRange::Last7Days => Duration::days(7),
        }
    }
}

impl FromStr for TimeRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1h" => Ok(TimeRange::LastHour),
            "24h" => Ok(TimeRange::Last24Hours),
            "7d" => Ok(TimeRange::Last7Days),
            other => anyhow::bail!("unknown time range: {other}"),
        }
    }
}

pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Parse backend summary keys: naive `2025-05-30T21:45:00`, taken as local
/// time, or RFC 3339, converted to local time.
pub fn parse_summary_time(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Local).naive_local())
        })
}

pub fn summarize(points: &[SummaryPoint], errors: &[f64]) -> AnalyticsSummary {
    let total_anomalies = points.iter().map(|p| p.count).sum();
    let peak_per_minute = points.iter().map(|p| p.count).max().unwrap_or(0);
    let avg_error = if errors.is_empty() {
        0.0
    } else {
        round4(errors.iter().sum::<f64>() / errors.len() as f64)
    };
    AnalyticsSummary {
        total_anomalies,
        peak_per_minute,
        avg_error,
        data_points: points.len(),
        error_samples: errors.len(),
    }
}

pub fn error_distribution(errors: &[f64]) -> Vec<ErrorBucket> {
    errors
        .iter()
        .enumerate()
        .map(|(i, &e)| ErrorBucket {
            index: i + 1,
            value: round4(e),
            category: ErrorCategory::of(e),
        })
        .collect()
}

/// Points within `range` of `now` (all when `range` is `None`). Points whose
/// time cannot be parsed are kept.
pub fn filter_range(
    points: &[SummaryPoint],
    range: Option<TimeRange>,
    now: NaiveDateTime,
) -> Vec<SummaryPoint> {
    let Some(range) = range else {
        return points.to_vec();
    };
    let cutoff = now - range.duration();
    points
        .iter()
        .filter(|p| parse_summary_time(&p.time).map_or(true, |t| t >= cutoff))
        .cloned()
        .collect()
}

pub fn chart_series(points: &[SummaryPoint]) -> Vec<ChartPoint> {
    points
        .iter()
        .map(|p| ChartPoint {
            time: p.time.clone(),
            label: parse_summary_time(&p.time)
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| p.time.clone()),
            count: p.count,
        })
        .collect()
}

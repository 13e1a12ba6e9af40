// src/activity.rs
//! Activity feed: snapshot filenames, their embedded timestamps, search and
//! pagination.
//!
//! Filenames start with `YYYYMMDD-HHMMSS` (e.g. `20250615-143022-xyz.jpg`).
//! Parsing is explicit: a filename that does not carry a valid timestamp is
//! reported as an error and displayed as [`INVALID_TIMESTAMP_LABEL`].

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::feed::normalize::{self, ShapeError};

pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const DEFAULT_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const INVALID_TIMESTAMP_LABEL: &str = "Invalid timestamp";

const PREFIX_LEN: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("filename shorter than 15 characters: {0:?}")]
    TooShort(String),
    #[error("prefix {0:?} is not YYYYMMDD-HHMMSS")]
    Malformed(String),
    #[error("prefix {0:?} is not a valid date/time")]
    OutOfRange(String),
}

/// Extract the `YYYYMMDD-HHMMSS` prefix of a snapshot filename.
pub fn parse_timestamp(filename: &str) -> Result<NaiveDateTime, TimestampError> {
    let prefix = filename
        .get(..PREFIX_LEN)
        .ok_or_else(|| TimestampError::TooShort(filename.to_string()))?;

    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(\d{4})(\d{2})(\d{2})-(\d{2})(\d{2})(\d{2})$").expect("timestamp regex")
    });
    let caps = re
        .captures(prefix)
        .ok_or_else(|| TimestampError::Malformed(prefix.to_string()))?;

    // All groups are ASCII digits of bounded width, so parsing cannot overflow.
    let num = |i: usize| caps[i].parse::<u32>().unwrap_or_default();
    NaiveDate::from_ymd_opt(num(1) as i32, num(2), num(3))
        .and_then(|d| d.and_hms_opt(num(4), num(5), num(6)))
        .ok_or_else(|| TimestampError::OutOfRange(prefix.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityRecord {
    pub filename: String,
}

impl ActivityRecord {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }

    pub fn timestamp(&self) -> Result<NaiveDateTime, TimestampError> {
        parse_timestamp(&self.filename)
    }

    pub fn display_time(&self, format: &str) -> String {
        match self.timestamp() {
            Ok(ts) => ts.format(format).to_string(),
            Err(_) => INVALID_TIMESTAMP_LABEL.to_string(),
        }
    }
}

/// Normalizer for `GET /predict/activity/list`.
pub fn activity_records(value: Value) -> Result<Vec<ActivityRecord>, ShapeError> {
    let names: Vec<String> = normalize::records_of(value)?;
    Ok(names.into_iter().map(ActivityRecord::new).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityItem {
    pub filename: String,
    pub display_time: String,
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityPage {
    pub items: Vec<ActivityItem>,
    /// 1-based, always within `[1, max(total_pages, 1)]`.
    pub page: usize,
    pub total_pages: usize,
    /// Number of records after filtering.
    pub total: usize,
}

/// Search + pagination state over the current activity records.
#[derive(Debug, Clone)]
pub struct ActivityView {
    records: Vec<ActivityRecord>,
    display_format: String,
    page_size: usize,
    search: String,
    page: usize,
}

impl Default for ActivityView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DEFAULT_DISPLAY_FORMAT)
    }
}

impl ActivityView {
    pub fn new(page_size: usize, display_format: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            display_format: display_format.into(),
            page_size: page_size.max(1),
            search: String::new(),
            page: 1,
        }
    }

    /// Replace the records (e.g. after a poll); the page is re-clamped.
    pub fn set_records(&mut self, records: Vec<ActivityRecord>) {
        self.records = records;
        self.page = self.clamp_page(self.page);
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// A changed search term always starts over at page 1.
    pub fn set_search(&mut self, term: &str) {
        if self.search != term {
            self.search = term.to_string();
            self.page = 1;
        }
    }

    /// Request a page; returns the page actually selected after clamping.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.page = self.clamp_page(page);
        self.page
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Records whose display time contains the search term, case-insensitive.
    pub fn filtered(&self) -> Vec<ActivityItem> {
        let needle = self.search.trim().to_lowercase();
        self.records
            .iter()
            .map(|r| {
                let timestamp = r.timestamp().ok();
                let display_time = match timestamp {
                    Some(ts) => ts.format(&self.display_format).to_string(),
                    None => INVALID_TIMESTAMP_LABEL.to_string(),
                };
                ActivityItem {
                    filename: r.filename.clone(),
                    display_time,
                    timestamp,
                }
            })
            .filter(|it| needle.is_empty() || it.display_time.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        pages_for(self.filtered().len(), self.page_size)
    }

    pub fn current_page(&self) -> ActivityPage {
        let filtered = self.filtered();
        let total = filtered.len();
        let total_pages = pages_for(total, self.page_size);
        let page = self.page.clamp(1, total_pages.max(1));
        let items = filtered
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .collect();
        ActivityPage {
            items,
            page,
            total_pages,
            total,
        }
    }

    fn clamp_page(&self, page: usize) -> usize {
        page.clamp(1, self.total_pages().max(1))
    }
}

fn pages_for(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

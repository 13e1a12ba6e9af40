// src/config/monitor.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use crate::activity::{DEFAULT_DISPLAY_FORMAT, DEFAULT_PAGE_SIZE};

pub const DEFAULT_CONFIG_PATH: &str = "config/monitor.toml";
pub const ENV_CONFIG_PATH: &str = "MONITOR_CONFIG_PATH";
pub const ENV_BACKEND_URL: &str = "BACKEND_URL";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";

const MIN_INTERVAL_MS: u64 = 100;

/// Poll interval per feed, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollIntervals {
    pub activity_ms: u64,
    pub summary_ms: u64,
    pub errors_ms: u64,
    pub heatmap_ms: u64,
    pub snapshots_ms: u64,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            activity_ms: 5_000,
            summary_ms: 30_000,
            errors_ms: 30_000,
            heatmap_ms: 60_000,
            snapshots_ms: 15_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Base URL of the inference backend, e.g. `http://127.0.0.1:8000`.
    pub backend_url: String,
    pub bind_addr: String,
    pub page_size: usize,
    /// chrono format for activity timestamps; 24-hour so searches like
    /// `14:30` match.
    pub display_format: String,
    pub preferences_path: PathBuf,
    /// Optional built frontend served at `/`.
    pub static_dir: Option<PathBuf>,
    pub request_timeout_ms: u64,
    pub intervals: PollIntervals,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8000".to_string(),
            bind_addr: "0.0.0.0:8080".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            display_format: DEFAULT_DISPLAY_FORMAT.to_string(),
            preferences_path: PathBuf::from("state/preferences.json"),
            static_dir: None,
            request_timeout_ms: 10_000,
            intervals: PollIntervals::default(),
        }
    }
}

impl MonitorConfig {
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading monitor config from {}", path.display()))?;
        let mut cfg: MonitorConfig = toml::from_str(&data)
            .with_context(|| format!("parsing monitor config {}", path.display()))?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Resolve config using env var + fallbacks, then apply env overrides:
    /// 1) $MONITOR_CONFIG_PATH (must exist)
    /// 2) config/monitor.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };

        if let Ok(url) = env::var(ENV_BACKEND_URL) {
            if !url.trim().is_empty() {
                cfg.backend_url = url.trim().to_string();
            }
        }
        if let Ok(addr) = env::var(ENV_BIND_ADDR) {
            if !addr.trim().is_empty() {
                cfg.bind_addr = addr.trim().to_string();
            }
        }
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn sanitize(&mut self) {
        let d = PollIntervals::default();
        let iv = &mut self.intervals;
        for (v, dflt) in [
            (&mut iv.activity_ms, d.activity_ms),
            (&mut iv.summary_ms, d.summary_ms),
            (&mut iv.errors_ms, d.errors_ms),
            (&mut iv.heatmap_ms, d.heatmap_ms),
            (&mut iv.snapshots_ms, d.snapshots_ms),
        ] {
            if *v == 0 {
                *v = dflt;
            } else if *v < MIN_INTERVAL_MS {
                *v = MIN_INTERVAL_MS;
            }
        }
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.display_format.trim().is_empty() {
            self.display_format = DEFAULT_DISPLAY_FORMAT.to_string();
        }
        self.backend_url = self.backend_url.trim_end_matches('/').to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: MonitorConfig = toml::from_str(
            r#"
backend_url = "http://cam:8000/"
[intervals]
summary_ms = 10000
"#,
        )
        .unwrap();
        assert_eq!(cfg.intervals.summary_ms, 10_000);
        assert_eq!(cfg.intervals.activity_ms, 5_000);
        assert_eq!(cfg.page_size, 12);
    }

    #[test]
    fn sanitize_fixes_degenerate_values() {
        let mut cfg = MonitorConfig {
            backend_url: "http://cam:8000/".into(),
            page_size: 0,
            display_format: " ".into(),
            ..MonitorConfig::default()
        };
        cfg.intervals.activity_ms = 0;
        cfg.intervals.errors_ms = 5;
        cfg.sanitize();
        assert_eq!(cfg.backend_url, "http://cam:8000");
        assert_eq!(cfg.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.display_format, DEFAULT_DISPLAY_FORMAT);
        assert_eq!(cfg.intervals.activity_ms, 5_000);
        assert_eq!(cfg.intervals.errors_ms, MIN_INTERVAL_MS);
    }
}

//! preferences.rs: dashboard preferences persisted as JSON.
//!
//! Loaded once at startup; every change is written back immediately. A missing
//! or unreadable file falls back to defaults (dark mode on).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

fn default_dark_mode() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_dark_mode")]
    pub dark_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: default_dark_mode(),
        }
    }
}

#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    current: RwLock<Preferences>,
}

impl PreferenceStore {
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let prefs = match fs::read_to_string(&path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(target: "prefs", path = %path.display(), error = %e, "corrupt preferences, using defaults");
                Preferences::default()
            }),
            Err(_) => Preferences::default(),
        };
        tracing::info!(target: "prefs", dark_mode = prefs.dark_mode, "preferences loaded");
        Self {
            path,
            current: RwLock::new(prefs),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Preferences {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_dark_mode(&self, on: bool) -> Preferences {
        self.update(|p| p.dark_mode = on)
    }

    pub fn toggle_dark_mode(&self) -> Preferences {
        self.update(|p| p.dark_mode = !p.dark_mode)
    }

    /// The file is written while the write lock is held, so concurrent
    /// updates reach disk in the same order they were applied in memory.
    fn update(&self, f: impl FnOnce(&mut Preferences)) -> Preferences {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        f(&mut *guard);
        self.save(&guard);
        *guard
    }

    fn save(&self, prefs: &Preferences) {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(dir) {
                tracing::warn!(target: "prefs", "preferences dir: {e:#}");
            }
        }
        let body = serde_json::to_vec_pretty(prefs).unwrap_or_default();
        if let Err(e) = fs::write(&self.path, body) {
            tracing::warn!(target: "prefs", path = %self.path.display(), "write preferences: {e:#}");
        }
    }
}

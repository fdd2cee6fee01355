use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::foundation::clock::{Clock, SystemClock};
use crate::foundation::config::StateConfig;
use crate::history::json_file::{read_json_or_default, write_json_atomic};

/// Used ids older than this are eligible again.
pub const USED_RETENTION_SECS: f64 = 7.0 * 24.0 * 3600.0;

/// A story id that was handed downstream, with the time it was picked.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UsageRecord {
    pub id: String,
    #[serde(default)]
    pub timestamp: f64,
}

/// A story id a reviewer rejected. Never expires.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlacklistRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub timestamp: f64,
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct UsedFile {
    #[serde(default)]
    used_ids: Vec<UsageRecord>,
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct BlacklistFile {
    #[serde(default)]
    blacklisted_ids: Vec<BlacklistRecord>,
}

/// Result of a state mutation. Failures are reported, never raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistOutcome {
    Written,
    AlreadyPresent,
    Failed { reason: String },
}

impl PersistOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    fn from_write(path: &Path, res: anyhow::Result<()>) -> Self {
        match res {
            Ok(()) => Self::Written,
            Err(e) => {
                let reason = format!("{e:#}");
                tracing::warn!(path = %path.display(), %reason, "state write failed");
                Self::Failed { reason }
            }
        }
    }
}

/// Used/blacklisted id history backed by two JSON files.
#[derive(Clone)]
pub struct HistoryStore {
    used_path: PathBuf,
    blacklist_path: PathBuf,
    clock: Rc<dyn Clock>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("used_path", &self.used_path)
            .field("blacklist_path", &self.blacklist_path)
            .finish_non_exhaustive()
    }
}

impl HistoryStore {
    pub fn new(used_path: impl Into<PathBuf>, blacklist_path: impl Into<PathBuf>) -> Self {
        Self {
            used_path: used_path.into(),
            blacklist_path: blacklist_path.into(),
            clock: Rc::new(SystemClock),
        }
    }

    pub fn from_config(cfg: &StateConfig) -> Self {
        Self::new(&cfg.used_path, &cfg.blacklist_path)
    }

    /// Replace the wall clock, e.g. with a [`crate::ManualClock`].
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn failed_read(path: &Path, e: anyhow::Error) -> PersistOutcome {
        let reason = format!("{e:#}");
        tracing::warn!(path = %path.display(), %reason, "state file unreadable; leaving it untouched");
        PersistOutcome::Failed { reason }
    }

    fn read_used(&self) -> UsedFile {
        read_json_or_default(&self.used_path).unwrap_or_else(|e| {
            tracing::warn!(path = %self.used_path.display(), error = %format!("{e:#}"), "treating used history as empty");
            UsedFile::default()
        })
    }

    fn read_blacklist(&self) -> BlacklistFile {
        read_json_or_default(&self.blacklist_path).unwrap_or_else(|e| {
            tracing::warn!(path = %self.blacklist_path.display(), error = %format!("{e:#}"), "treating blacklist as empty");
            BlacklistFile::default()
        })
    }

    /// Usage records younger than [`USED_RETENTION_SECS`].
    pub fn active_usage(&self) -> Vec<UsageRecord> {
        let now = self.clock.now_epoch_secs();
        self.read_used()
            .used_ids
            .into_iter()
            .filter(|r| now - r.timestamp < USED_RETENTION_SECS)
            .collect()
    }

    pub fn load_used(&self) -> HashSet<String> {
        self.active_usage().into_iter().map(|r| r.id).collect()
    }

    /// Record `id` as used. Expired records are pruned from the file on the same write.
    /// A corrupt file is reported as [`PersistOutcome::Failed`] and not overwritten.
    pub fn mark_used(&self, id: &str) -> PersistOutcome {
        let file: UsedFile = match read_json_or_default(&self.used_path) {
            Ok(file) => file,
            Err(e) => return Self::failed_read(&self.used_path, e),
        };
        let now = self.clock.now_epoch_secs();
        let mut active: Vec<UsageRecord> = file
            .used_ids
            .into_iter()
            .filter(|r| now - r.timestamp < USED_RETENTION_SECS)
            .collect();
        if active.iter().any(|r| r.id == id) {
            return PersistOutcome::AlreadyPresent;
        }
        active.push(UsageRecord {
            id: id.to_string(),
            timestamp: now,
        });
        let file = UsedFile { used_ids: active };
        PersistOutcome::from_write(&self.used_path, write_json_atomic(&self.used_path, &file))
    }

    pub fn reset_used(&self) -> PersistOutcome {
        tracing::info!(path = %self.used_path.display(), "resetting used story history");
        PersistOutcome::from_write(
            &self.used_path,
            write_json_atomic(&self.used_path, &UsedFile::default()),
        )
    }

    pub fn blacklist(&self) -> Vec<BlacklistRecord> {
        self.read_blacklist().blacklisted_ids
    }

    pub fn load_blacklisted(&self) -> HashSet<String> {
        self.blacklist().into_iter().map(|r| r.id).collect()
    }

    /// Append `id` to the blacklist. An existing file that cannot be parsed is left as is.
    pub fn mark_blacklisted(&self, id: &str, title: &str) -> PersistOutcome {
        let mut file: BlacklistFile = match read_json_or_default(&self.blacklist_path) {
            Ok(file) => file,
            Err(e) => return Self::failed_read(&self.blacklist_path, e),
        };
        if file.blacklisted_ids.iter().any(|r| r.id == id) {
            return PersistOutcome::AlreadyPresent;
        }
        file.blacklisted_ids.push(BlacklistRecord {
            id: id.to_string(),
            title: title.to_string(),
            timestamp: self.clock.now_epoch_secs(),
        });
        PersistOutcome::from_write(
            &self.blacklist_path,
            write_json_atomic(&self.blacklist_path, &file),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/store.rs"]
mod tests;

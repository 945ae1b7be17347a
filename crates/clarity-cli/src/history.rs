//! Report history kept in a small JSON file.
//!
//! Newest entry first, capped at a fixed number of entries. A missing or
//! corrupt file reads as an empty history.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use clarity_common::{InterpretedFinding, Status};

/// Findings from one successful interpretation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub results: Vec<InterpretedFinding>,
}

impl HistoryEntry {
    /// One-line summary, e.g. "Hemoglobin: low, Glucose: normal".
    pub fn summary(&self) -> String {
        self.results
            .iter()
            .map(|r| format!("{}: {}", r.display_name, r.status))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One value of a biomarker over time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub unit: String,
    pub status: Status,
}

pub struct HistoryStore {
    path: PathBuf,
    max_entries: usize,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self { path: path.into(), max_entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Vec<HistoryEntry> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                debug!("No history at {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring unreadable history file {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Prepend an entry for `results`, drop the oldest beyond the cap, and save.
    pub fn record(&self, results: &[InterpretedFinding], date: DateTime<Utc>) -> anyhow::Result<Vec<HistoryEntry>> {
        let mut history = self.load();
        history.insert(0, HistoryEntry { date, results: results.to_vec() });
        history.truncate(self.max_entries);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&history)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing history to {}", self.path.display()))?;
        Ok(history)
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("removing {}", self.path.display()))?;
        }
        Ok(())
    }

    /// Entry at 1-based `position` in the newest-first listing.
    pub fn entry(&self, position: usize) -> Option<HistoryEntry> {
        let index = position.checked_sub(1)?;
        self.load().into_iter().nth(index)
    }

    /// All recorded values of `biomarker_key`, oldest first.
    pub fn trend(&self, biomarker_key: &str) -> Vec<TrendPoint> {
        let mut points: Vec<TrendPoint> = self
            .load()
            .into_iter()
            .flat_map(|entry| entry.results)
            .filter(|r| r.biomarker_key == biomarker_key)
            .map(|r| TrendPoint { timestamp: r.timestamp, value: r.value, unit: r.unit, status: r.status })
            .collect();
        points.sort_by_key(|p| p.timestamp);
        points
    }
}

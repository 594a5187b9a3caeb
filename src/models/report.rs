//! Outcome of a full refresh run.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of refreshing (or deriving) one step of a run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    /// Records were fetched and persisted
    Refreshed { records: usize },
    /// The API returned nothing, the existing cache was kept
    Empty,
    /// A derived file was written with this many entries
    Written { values: usize },
    /// Step was not applicable, e.g. no questions section configured
    Skipped { reason: String },
    Failed { error: String },
}

impl StepStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Summary of a `refresh_all` run.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Per-section refresh status, in configuration order
    pub sections: Vec<(String, StepStatus)>,
    /// Per-derived-file status
    pub derived: Vec<(String, StepStatus)>,
}

impl RefreshReport {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            start_time: now,
            end_time: now,
            sections: Vec::new(),
            derived: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.sections
            .iter()
            .chain(&self.derived)
            .all(|(_, status)| !status.is_failure())
    }

    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.sections
            .iter()
            .chain(&self.derived)
            .filter_map(|(name, status)| match status {
                StepStatus::Failed { error } => Some((name.as_str(), error.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Total records fetched across refreshed sections.
    pub fn record_count(&self) -> usize {
        self.sections
            .iter()
            .map(|(_, status)| match status {
                StepStatus::Refreshed { records } => *records,
                _ => 0,
            })
            .sum()
    }

    pub(crate) fn finish(mut self) -> Self {
        self.end_time = Utc::now();
        self
    }
}

impl Default for RefreshReport {
    fn default() -> Self {
        Self::new()
    }
}

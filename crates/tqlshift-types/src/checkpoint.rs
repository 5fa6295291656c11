//! Checkpoint history reports.
//!
//! The platform answers `SHOW <app> CHECKPOINT HISTORY;` with a list of
//! entries, most recent first. Only the free-text position summary of the
//! first entry is ever consulted.

use serde::{Deserialize, Serialize};

/// One recorded checkpoint of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointEntry {
    /// Connector-specific free text describing the source position.
    #[serde(default)]
    pub source_position_summary: String,
}

/// Checkpoint history of a pipeline, most recent entry first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointReport {
    pub entries: Vec<CheckpointEntry>,
}

impl CheckpointReport {
    /// Build a single-entry report from a bare summary text.
    #[must_use]
    pub fn from_summary(summary: impl Into<String>) -> Self {
        Self {
            entries: vec![CheckpointEntry {
                source_position_summary: summary.into(),
            }],
        }
    }

    /// The most recent entry; first in document order wins.
    #[must_use]
    pub fn latest(&self) -> Option<&CheckpointEntry> {
        self.entries.first()
    }

    #[must_use]
    pub fn latest_summary(&self) -> Option<&str> {
        self.latest()
            .map(|entry| entry.source_position_summary.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

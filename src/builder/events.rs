//! Build event types for JSON output.
//!
//! These events are emitted one per line when using `--message-format=json`.
//! New fields may be added, but existing fields should not be removed or
//! renamed.

use std::path::PathBuf;

use serde::Serialize;

/// A build event emitted during a matrix build.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    /// Work on a target began.
    #[serde(rename = "target-started")]
    TargetStarted {
        target: String,
        /// Position in the matrix, starting at 1
        index: usize,
        total: usize,
    },

    /// A target finished, successfully or not.
    #[serde(rename = "target-finished")]
    TargetFinished {
        target: String,
        success: bool,
        /// Target output directory
        path: PathBuf,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// The whole matrix completed (success or failure).
    #[serde(rename = "build-finished")]
    BuildFinished {
        success: bool,
        /// Total build duration in milliseconds
        duration_ms: u64,
        /// Number of targets that succeeded
        targets_built: usize,
        targets_failed: usize,
    },
}

impl BuildEvent {
    pub fn started(target: impl Into<String>, index: usize, total: usize) -> Self {
        BuildEvent::TargetStarted {
            target: target.into(),
            index,
            total,
        }
    }

    pub fn target_finished(
        target: impl Into<String>,
        path: impl Into<PathBuf>,
        error: Option<String>,
    ) -> Self {
        BuildEvent::TargetFinished {
            target: target.into(),
            success: error.is_none(),
            path: path.into(),
            message: error,
        }
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

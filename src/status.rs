//! Profiling task status snapshots and their classification.
//!
//! The server reports task progress as an open-ended set of status strings.
//! [`TaskState`] narrows them to a closed enumeration through a single
//! classification table, so that the poller never compares raw strings.
//!
//! # Classification table
//!
//! ```text
//! SUCCESS, COMPLETED                 -> Succeeded (terminal)
//! FAILED, ERROR, CANCELLED, TIMEOUT  -> Failed    (terminal)
//! PENDING, RUNNING                   -> Pending
//! anything else                      -> Unknown   (treated as pending)
//! ```
//!
//! Matching ignores ASCII case.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Labels that mean the task finished successfully.
pub const SUCCESS_LABELS: &[&str] = &["SUCCESS", "COMPLETED"];

/// Labels that mean the task finished without producing a result.
pub const FAILURE_LABELS: &[&str] = &["FAILED", "ERROR", "CANCELLED", "TIMEOUT"];

/// Labels that mean the task is still in progress.
pub const PENDING_LABELS: &[&str] = &["PENDING", "RUNNING"];

/// Label substituted when a snapshot carries no `status` field.
pub const MISSING_STATUS_LABEL: &str = "UNKNOWN";

/// Classified state of a profiling task.
///
/// # Examples
///
/// ```
/// use profiler_tester::TaskState;
///
/// assert_eq!(TaskState::classify("COMPLETED"), TaskState::Succeeded);
/// assert_eq!(TaskState::classify("error"), TaskState::Failed);
/// assert_eq!(TaskState::classify("RUNNING"), TaskState::Pending);
/// assert_eq!(TaskState::classify("PAUSED"), TaskState::Unknown);
/// assert!(TaskState::Failed.is_terminal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Terminal success.
    Succeeded,
    /// Terminal failure.
    Failed,
    /// Recognised in-progress label.
    Pending,
    /// Label not present in the classification table.
    Unknown,
}

impl TaskState {
    /// Classify a raw status label.
    pub fn classify(label: &str) -> Self {
        let label = label.trim();
        let matches = |table: &[&str]| table.iter().any(|l| l.eq_ignore_ascii_case(label));

        if matches(SUCCESS_LABELS) {
            Self::Succeeded
        } else if matches(FAILURE_LABELS) {
            Self::Failed
        } else if matches(PENDING_LABELS) {
            Self::Pending
        } else {
            Self::Unknown
        }
    }

    /// Returns `true` if the task will not change state any further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Pending => write!(f, "pending"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Point-in-time task status as returned by `GET /profiling/task-status/{id}`.
///
/// Only `status` drives classification; the other fields are kept for log
/// output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusSnapshot {
    /// Raw status label. `None` when the server omitted it or sent `null`.
    #[serde(default)]
    pub status: Option<String>,
    /// Task identifier echoed by the server.
    #[serde(default)]
    pub task_id: Option<String>,
    /// Free-form execution info.
    #[serde(default)]
    pub info: Option<String>,
    /// Total number of data sources the task covers.
    #[serde(default)]
    pub total_data_sources: Option<u32>,
    /// Number of data sources processed so far.
    #[serde(default)]
    pub processed_data_sources: Option<u32>,
}

impl TaskStatusSnapshot {
    /// Build a snapshot carrying only a status label.
    pub fn with_status(label: impl Into<String>) -> Self {
        Self {
            status: Some(label.into()),
            ..Self::default()
        }
    }

    /// The status label, or [`MISSING_STATUS_LABEL`] when absent.
    pub fn label(&self) -> &str {
        self.status.as_deref().unwrap_or(MISSING_STATUS_LABEL)
    }

    /// Classify this snapshot.
    pub fn state(&self) -> TaskState {
        TaskState::classify(self.label())
    }

    /// `processed/total` progress, when the server reports both counts.
    pub fn progress(&self) -> Option<String> {
        match (self.processed_data_sources, self.total_data_sources) {
            (Some(done), Some(total)) => Some(format!("{done}/{total}")),
            _ => None,
        }
    }
}

//! Fixed-interval polling of asynchronous profiling tasks.
//!
//! The server exposes no push or long-poll endpoint for task completion, so
//! a test step that starts a profiling task has to query its status until it
//! reaches a terminal state. [`TaskPoller`] bounds that wait to
//! `max_attempts` queries separated by a fixed interval, which caps a single
//! wait at roughly `max_attempts x interval` of wall-clock time.
//!
//! # State machine
//!
//! ```text
//! query -> Succeeded                    => Completed
//! query -> Failed                       => Failed (terminal status)
//! query -> transport / non-200 error    => Failed (transport, no retry)
//! query -> Pending | Unknown            => sleep, query again
//! budget exhausted while not terminal   => TimedOut
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::status::{TaskState, TaskStatusSnapshot};

/// Default number of status queries before a task is declared timed out.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Default delay between two status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Source of task status snapshots.
///
/// Implemented by [`ApiClient`](crate::client::ApiClient) against the live
/// server, and by scripted sources in tests.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the current status of the task identified by `handle`.
    async fn fetch_status(&self, handle: &str) -> Result<TaskStatusSnapshot, ApiError>;
}

/// Attempt budget and inter-attempt delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of status queries.
    pub max_attempts: u32,
    /// Delay between two consecutive queries.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollPolicy {
    /// Create a policy with the given budget and interval.
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound on the time spent sleeping during one poll.
    pub fn worst_case_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Why a poll ended without the task completing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollFailure {
    /// The status query itself failed. Never retried.
    Transport(ApiError),
    /// The server reported a terminal failure label.
    Terminal {
        status: String,
        info: Option<String>,
    },
}

/// Final classification of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The task reached a success label.
    Completed {
        attempts: u32,
        snapshot: TaskStatusSnapshot,
    },
    /// The task failed, or its status could not be queried.
    Failed { attempts: u32, failure: PollFailure },
    /// The budget ran out while the task was still pending.
    TimedOut {
        attempts: u32,
        last_status: Option<String>,
    },
}

impl PollOutcome {
    /// Returns `true` only for [`PollOutcome::Completed`].
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Number of status queries that were issued.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Completed { attempts, .. }
            | Self::Failed { attempts, .. }
            | Self::TimedOut { attempts, .. } => *attempts,
        }
    }

    /// Human-readable reason for a non-completed outcome.
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Completed { .. } => None,
            Self::Failed {
                failure: PollFailure::Transport(err),
                ..
            } => Some(format!("Failed to get task status ({err})")),
            Self::Failed {
                failure: PollFailure::Terminal { status, info },
                ..
            } => Some(match info {
                Some(info) => format!("Task failed with status: {status} ({info})"),
                None => format!("Task failed with status: {status}"),
            }),
            Self::TimedOut {
                attempts,
                last_status,
            } => Some(match last_status {
                Some(status) => format!(
                    "Task did not complete within timeout ({attempts} attempts, last status: {status})"
                ),
                None => format!("Task did not complete within timeout ({attempts} attempts)"),
            }),
        }
    }
}

/// Polls a [`StatusSource`] until the task is terminal or the budget is spent.
pub struct TaskPoller<'a, S: StatusSource + ?Sized> {
    source: &'a S,
    policy: PollPolicy,
}

impl<'a, S: StatusSource + ?Sized> TaskPoller<'a, S> {
    /// Create a poller over `source` with the given policy.
    pub fn new(source: &'a S, policy: PollPolicy) -> Self {
        Self { source, policy }
    }

    /// The policy this poller runs with.
    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Poll the task identified by `handle` to a final [`PollOutcome`].
    ///
    /// The source is queried at most `max_attempts` times. A terminal
    /// failure label or a query error stops immediately. No sleep happens
    /// after the last attempt.
    pub async fn poll(&self, handle: &str) -> PollOutcome {
        let mut last_status = None;

        for attempt in 1..=self.policy.max_attempts {
            let snapshot = match self.source.fetch_status(handle).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    debug!(task_id = handle, attempt, error = %err, "status query failed");
                    return PollOutcome::Failed {
                        attempts: attempt,
                        failure: PollFailure::Transport(err),
                    };
                },
            };

            let label = snapshot.label().to_string();
            match snapshot.state() {
                TaskState::Succeeded => {
                    debug!(task_id = handle, attempt, status = %label, "task completed");
                    return PollOutcome::Completed {
                        attempts: attempt,
                        snapshot,
                    };
                },
                TaskState::Failed => {
                    return PollOutcome::Failed {
                        attempts: attempt,
                        failure: PollFailure::Terminal {
                            status: label,
                            info: snapshot.info,
                        },
                    };
                },
                TaskState::Pending => {
                    let progress = snapshot.progress().unwrap_or_else(|| "-".to_string());
                    info!(
                        task_id = handle,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        progress = %progress,
                        "Task status: {label}, waiting..."
                    );
                },
                TaskState::Unknown => {
                    warn!(
                        task_id = handle,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        "Unrecognised task status: {label}, treating as pending"
                    );
                },
            }
            last_status = Some(label);

            if attempt < self.policy.max_attempts {
                tokio::time::sleep(self.policy.interval).await;
            }
        }

        PollOutcome::TimedOut {
            attempts: self.policy.max_attempts,
            last_status,
        }
    }
}

//! Shared test doubles.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use profiler_tester::{ApiError, StatusSource, TaskStatusSnapshot};
use tokio::time::Instant;

/// Status source replaying a fixed script of replies.
///
/// Once the script is exhausted it keeps answering `RUNNING`. Every call is
/// timestamped with the (possibly paused) tokio clock.
pub struct ScriptedSource {
    replies: Mutex<Vec<Result<TaskStatusSnapshot, ApiError>>>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedSource {
    pub fn new(replies: Vec<Result<TaskStatusSnapshot, ApiError>>) -> Self {
        let mut replies = replies;
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script made of status labels only.
    pub fn labels<S: AsRef<str>>(labels: &[S]) -> Self {
        Self::new(
            labels
                .iter()
                .map(|l| Ok(TaskStatusSnapshot::with_status(l.as_ref())))
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch_status(&self, _handle: &str) -> Result<TaskStatusSnapshot, ApiError> {
        self.calls.lock().unwrap().push(Instant::now());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok(TaskStatusSnapshot::with_status("RUNNING")))
    }
}

/// Config pointing at `base_url` with one MySQL data source fixture and the
/// given sample file.
pub fn config_for(base_url: &str, sample_file: &std::path::Path) -> profiler_tester::TestConfig {
    let json = serde_json::json!({
        "api_base_url": base_url,
        "test_data_sources": [{
            "name": "mysql",
            "payload": {
                "name": "Orders DB",
                "type": "MYSQL",
                "properties": { "host": "localhost", "port": "3306" }
            }
        }],
        "sample_file_path": sample_file,
        "polling": { "max_attempts": 3, "interval_ms": 0 }
    });
    profiler_tester::TestConfig::from_json(&json.to_string()).unwrap()
}

/// Quiet runner with a three-attempt, zero-interval poll policy.
pub fn runner_for(base_url: &str, sample_file: &std::path::Path) -> profiler_tester::TestRunner {
    profiler_tester::TestRunner::new(config_for(base_url, sample_file))
        .unwrap()
        .quiet(true)
}

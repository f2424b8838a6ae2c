//! Data Profiler Integration Testing Library
//!
//! This crate drives end-to-end tests against a running Data Profiler
//! platform over its REST API. It can be used as a standalone CLI tool
//! (`profiler-tester`) or as a library.
//!
//! The core piece is the [`TaskPoller`]: profiling work runs asynchronously
//! on the server, so after starting a task the runner queries its status a
//! bounded number of times and classifies the result as completed, failed
//! or timed out.
//!
//! # Examples
//!
//! ## Run Every Module
//!
//! ```no_run
//! use profiler_tester::{ModuleSelection, TestConfig, TestRunner};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = TestConfig::load("test_config.json".as_ref())?;
//!     let mut runner = TestRunner::new(config)?;
//!
//!     let success = runner.run(ModuleSelection::All).await;
//!     println!("{}", profiler_tester::summary::render_summary(runner.report()));
//!
//!     std::process::exit(if success { 0 } else { 1 });
//! }
//! ```
//!
//! ## Poll a Task Directly
//!
//! ```no_run
//! use profiler_tester::{ApiClient, PollPolicy, TaskPoller};
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ApiClient::new("http://localhost:8080", None)?;
//!     let policy = PollPolicy::new(10, Duration::from_secs(1));
//!
//!     let outcome = TaskPoller::new(&client, policy).poll("task-42").await;
//!     match outcome.failure_reason() {
//!         None => println!("completed after {} attempts", outcome.attempts()),
//!         Some(reason) => println!("{reason}"),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod modules;
pub mod poller;
pub mod report;
pub mod runner;
pub mod status;
pub mod summary;

// Re-export commonly used types
pub use client::{ApiClient, ApiRequest, ApiResponse, RequestBody};
pub use config::TestConfig;
pub use error::{ApiError, ConfigError};
pub use modules::{ModuleSelection, TestModule};
pub use poller::{PollFailure, PollOutcome, PollPolicy, StatusSource, TaskPoller};
pub use report::{RunReport, TestReport, TestStatus};
pub use runner::TestRunner;
pub use status::{TaskState, TaskStatusSnapshot};

//! Test modules exercising one area of the API each.
//!
//! Every module returns `Ok(true)` when all of its counted steps passed,
//! `Ok(false)` when at least one failed, and `Err` when a transport error
//! aborted it. Cleanup steps are recorded but do not change the result.

mod dashboard;
mod datasource;
mod file_upload;
mod profiling;
mod reports;

use std::fmt;

use crate::error::ApiError;
use crate::runner::TestRunner;

/// A single test module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestModule {
    /// Data source CRUD and connection test.
    Datasource,
    /// Profiling task lifecycle.
    Profiling,
    /// Summary and detailed report queries after a profiling run.
    Report,
    /// File upload through profiling, reports and deletion.
    File,
    /// Dashboard aggregate queries.
    Dashboard,
}

impl TestModule {
    /// Short name used on the command line and in reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Datasource => "datasource",
            Self::Profiling => "profiling",
            Self::Report => "report",
            Self::File => "file",
            Self::Dashboard => "dashboard",
        }
    }

    /// Display title used in banners and module verdict lines.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Datasource => "Data Source Module",
            Self::Profiling => "Profiling Module",
            Self::Report => "Report Module",
            Self::File => "File Upload Lifecycle",
            Self::Dashboard => "Dashboard Module",
        }
    }

    pub(crate) async fn run(self, runner: &mut TestRunner) -> Result<bool, ApiError> {
        match self {
            Self::Datasource => datasource::run(runner).await,
            Self::Profiling => profiling::run(runner).await,
            Self::Report => reports::run(runner).await,
            Self::File => file_upload::run(runner).await,
            Self::Dashboard => dashboard::run(runner).await,
        }
    }
}

impl fmt::Display for TestModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Module selection accepted by `--module`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModuleSelection {
    Datasource,
    Profiling,
    Report,
    File,
    Dashboard,
    /// Datasource, profiling, report and file, in that order.
    All,
}

impl ModuleSelection {
    /// Modules run by `all`. The dashboard module is opt-in.
    pub const ALL_MODULES: [TestModule; 4] = [
        TestModule::Datasource,
        TestModule::Profiling,
        TestModule::Report,
        TestModule::File,
    ];

    /// The modules this selection runs, in order.
    pub fn modules(&self) -> Vec<TestModule> {
        match self {
            Self::Datasource => vec![TestModule::Datasource],
            Self::Profiling => vec![TestModule::Profiling],
            Self::Report => vec![TestModule::Report],
            Self::File => vec![TestModule::File],
            Self::Dashboard => vec![TestModule::Dashboard],
            Self::All => Self::ALL_MODULES.to_vec(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Datasource => TestModule::Datasource.name(),
            Self::Profiling => TestModule::Profiling.name(),
            Self::Report => TestModule::Report.name(),
            Self::File => TestModule::File.name(),
            Self::Dashboard => TestModule::Dashboard.name(),
        }
    }
}

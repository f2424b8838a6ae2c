//! Test result accounting and JSON report output.
//!
//! [`TestReport`] owns the run/passed/failed counters together with one
//! [`StepResult`] per check and one [`ModuleResult`] per executed module.
//! Each check increments `tests_run` and exactly one of `tests_passed` or
//! `tests_failed`.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Schema version for the JSON report format.
///
/// Increment when making breaking changes to the report structure.
const SCHEMA_VERSION: &str = "1.0";

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "PASS"),
            Self::Failed => write!(f, "FAIL"),
        }
    }
}

/// One recorded check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    /// Module the check belongs to.
    pub module: String,
    /// Step label, e.g. `"Step 2: Test Connection (Status: 200)"`.
    pub name: String,
    pub status: TestStatus,
    /// Diagnostic lines (request and response) for failed checks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// Overall result of one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleResult {
    pub name: String,
    pub success: bool,
}

/// Counters and records for a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestReport {
    pub tests_run: u32,
    pub tests_passed: u32,
    pub tests_failed: u32,
    pub modules: Vec<ModuleResult>,
    pub steps: Vec<StepResult>,
}

impl TestReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a passed check.
    pub fn pass(&mut self, module: &str, name: impl Into<String>) -> &StepResult {
        self.record(module, name.into(), TestStatus::Passed, Vec::new())
    }

    /// Record a failed check with diagnostic lines.
    pub fn fail(
        &mut self,
        module: &str,
        name: impl Into<String>,
        details: Vec<String>,
    ) -> &StepResult {
        self.record(module, name.into(), TestStatus::Failed, details)
    }

    fn record(
        &mut self,
        module: &str,
        name: String,
        status: TestStatus,
        details: Vec<String>,
    ) -> &StepResult {
        self.tests_run += 1;
        match status {
            TestStatus::Passed => self.tests_passed += 1,
            TestStatus::Failed => self.tests_failed += 1,
        }
        self.steps.push(StepResult {
            module: module.to_string(),
            name,
            status,
            details,
        });
        &self.steps[self.steps.len() - 1]
    }

    /// Record the overall result of a module.
    pub fn finish_module(&mut self, name: &str, success: bool) {
        self.modules.push(ModuleResult {
            name: name.to_string(),
            success,
        });
    }

    /// `true` when no check failed and every module succeeded.
    pub fn all_passed(&self) -> bool {
        self.tests_failed == 0 && self.modules.iter().all(|m| m.success)
    }

    /// Steps of one module, in execution order.
    pub fn steps_for<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a StepResult> + 'a {
        self.steps.iter().filter(move |s| s.module == module)
    }

    /// Find the first step of `module` whose name starts with `prefix`.
    pub fn find_step(&self, module: &str, prefix: &str) -> Option<&StepResult> {
        self.steps
            .iter()
            .find(|s| s.module == module && s.name.starts_with(prefix))
    }
}

/// Self-contained JSON report written at the end of a run.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    /// Report format version for parser compatibility.
    pub schema_version: &'static str,
    /// RFC 3339 timestamp when the report was generated.
    pub timestamp: String,
    /// Base URL the run targeted.
    pub base_url: &'a str,
    /// Module selection passed on the command line.
    pub selection: &'a str,
    pub success: bool,
    #[serde(flatten)]
    pub results: &'a TestReport,
}

impl<'a> RunReport<'a> {
    pub fn new(results: &'a TestReport, base_url: &'a str, selection: &'a str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            timestamp: chrono::Utc::now().to_rfc3339(),
            base_url,
            selection,
            success: results.all_passed(),
            results,
        }
    }
}

/// Write a JSON report to `path`, creating parent directories as needed.
pub fn write_report(report: &RunReport<'_>, path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_check_increments_run_and_one_outcome() {
        let mut report = TestReport::new();
        report.pass("datasource", "Step 1: Create Data Source (Status: 201)");
        report.fail(
            "datasource",
            "Step 2: Test Connection - Expected 200, got 500",
            vec!["Request URL: http://h/datasources/1/test".to_string()],
        );
        report.pass("profiling", "Step 3: Task completed successfully");

        assert_eq!(report.tests_run, 3);
        assert_eq!(report.tests_passed, 2);
        assert_eq!(report.tests_failed, 1);
        assert_eq!(report.steps_for("datasource").count(), 2);
        assert!(!report.all_passed());
    }

    #[test]
    fn failed_module_fails_the_run_even_without_failed_checks() {
        let mut report = TestReport::new();
        report.pass("datasource", "Step 1");
        report.finish_module("datasource", false);
        assert!(!report.all_passed());
    }

    #[test]
    fn empty_report_passes() {
        assert!(TestReport::new().all_passed());
    }

    #[test]
    fn find_step_by_prefix() {
        let mut report = TestReport::new();
        report.pass("file", "Step 6: Delete Data Source (Status: 204)");
        report.fail("file", "Step 7: Verify Deletion - Expected 404, got 200", vec![]);

        let step = report.find_step("file", "Step 7").unwrap();
        assert_eq!(step.status, TestStatus::Failed);
        assert!(report.find_step("datasource", "Step 7").is_none());
    }

    #[test]
    fn find_step_outlives_temporary_module_name() {
        let mut report = TestReport::new();
        report.pass("report", "Step 4: Query Summary Report (Status: 200)");

        let step = {
            let module = String::from("report");
            report.find_step(&module, "Step 4")
        };
        assert_eq!(step.map(|s| s.status), Some(TestStatus::Passed));
    }

    #[test]
    fn run_report_serializes_flattened_counters() {
        let mut report = TestReport::new();
        report.pass("report", "Step 4: Query Summary Report (Status: 200)");
        report.finish_module("report", true);

        let run = RunReport::new(&report, "http://localhost:8080", "report");
        let value = serde_json::to_value(&run).unwrap();
        assert_eq!(value["schema_version"], "1.0");
        assert_eq!(value["tests_run"], 1);
        assert_eq!(value["success"], true);
        assert_eq!(value["steps"][0]["status"], "passed");
        assert!(value["steps"][0].get("details").is_none());
        assert_eq!(value["modules"][0]["name"], "report");
    }

    #[test]
    fn write_report_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");
        let report = TestReport::new();

        write_report(&RunReport::new(&report, "http://h", "all"), &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["selection"], "all");
    }
}

//! Terminal rendering of step lines and the end-of-run summary.
//!
//! The functions here are pure: they take report data and return strings.
//! Color is applied with `colored`, which honours the global override set
//! when `--no-color` is passed or stdout is not a terminal.

use colored::Colorize;

use crate::report::{StepResult, TestReport, TestStatus};

/// Width of the separator line above the summary.
const SEPARATOR_WIDTH: usize = 50;

/// Render one recorded step as `[PASS] name` / `[FAIL] name` plus its
/// indented diagnostic lines.
pub fn render_step(step: &StepResult) -> String {
    let tag = format!("[{}]", step.status);
    let tag = match step.status {
        TestStatus::Passed => tag.green().to_string(),
        TestStatus::Failed => tag.red().bold().to_string(),
    };

    let mut lines = vec![format!("{tag} {}", step.name)];
    lines.extend(step.details.iter().map(|detail| format!("    {detail}")));
    lines.join("\n")
}

/// Render an informational line.
pub fn render_info(message: &str) -> String {
    format!("{} {message}", "[INFO]".cyan())
}

/// Banner printed before each module when running them all.
pub fn render_module_banner(title: &str) -> String {
    let bar = "=".repeat(20);
    format!("\n{bar} {} {bar}", title.bold())
}

/// Module-level verdict printed after each module when running them all.
/// Not counted as a check.
pub fn render_module_verdict(title: &str, success: bool) -> String {
    if success {
        format!("{} {title} test passed", "[PASS]".green())
    } else {
        format!("{} {title} test failed", "[FAIL]".red().bold())
    }
}

/// Render the end-of-run summary.
///
/// ```text
/// ==================================================
/// SUMMARY:
/// Tests Run: 12, Passed: 11, Failed: 1
///   datasource: passed
///   profiling:  failed
/// [FAILURE] 1 test(s) failed
/// ```
pub fn render_summary(report: &TestReport) -> String {
    let mut lines = vec![
        String::new(),
        "=".repeat(SEPARATOR_WIDTH),
        "SUMMARY:".bold().to_string(),
        format!(
            "Tests Run: {}, Passed: {}, Failed: {}",
            report.tests_run, report.tests_passed, report.tests_failed
        ),
    ];

    let width = report
        .modules
        .iter()
        .map(|m| m.name.len())
        .max()
        .unwrap_or(0);
    for module in &report.modules {
        let label = format!("{}:", module.name);
        let verdict = if module.success {
            "passed".green()
        } else {
            "failed".red()
        };
        lines.push(format!("  {label:<pad$} {verdict}", pad = width + 1));
    }

    if report.all_passed() {
        lines.push("[SUCCESS] All tests passed!".green().bold().to_string());
    } else if report.tests_failed > 0 {
        lines.push(
            format!("[FAILURE] {} test(s) failed", report.tests_failed)
                .red()
                .bold()
                .to_string(),
        );
    } else {
        let failed_modules = report.modules.iter().filter(|m| !m.success).count();
        lines.push(
            format!("[FAILURE] {failed_modules} module(s) failed")
                .red()
                .bold()
                .to_string(),
        );
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn step_line_has_tag_and_indented_details() {
        plain();
        let step = StepResult {
            module: "datasource".to_string(),
            name: "Step 2: Test Connection - Expected 200, got 500".to_string(),
            status: TestStatus::Failed,
            details: vec![
                "Request URL: http://h/datasources/ds-1/test".to_string(),
                "Request Method: POST".to_string(),
            ],
        };
        assert_eq!(
            render_step(&step),
            "[FAIL] Step 2: Test Connection - Expected 200, got 500\n    \
             Request URL: http://h/datasources/ds-1/test\n    Request Method: POST"
        );
    }

    #[test]
    fn summary_reports_success() {
        plain();
        let mut report = TestReport::new();
        report.pass("datasource", "Step 1");
        report.finish_module("datasource", true);

        let summary = render_summary(&report);
        assert!(summary.contains("Tests Run: 1, Passed: 1, Failed: 0"));
        assert!(summary.contains("  datasource: passed"));
        assert!(summary.ends_with("[SUCCESS] All tests passed!"));
    }

    #[test]
    fn summary_reports_failure_count() {
        plain();
        let mut report = TestReport::new();
        report.pass("profiling", "Step 1");
        report.fail("profiling", "Step 3: Task failed with status: FAILED", vec![]);
        report.fail("profiling", "Step 4", vec![]);
        report.finish_module("profiling", false);
        report.finish_module("report", true);

        let summary = render_summary(&report);
        assert!(summary.contains("Tests Run: 3, Passed: 1, Failed: 2"));
        assert!(summary.contains("  profiling: failed"));
        assert!(summary.contains("  report:    passed"));
        assert!(summary.ends_with("[FAILURE] 2 test(s) failed"));
    }

    #[test]
    fn summary_reports_failed_module_without_failed_checks() {
        plain();
        let mut report = TestReport::new();
        report.finish_module("file", false);
        assert!(render_summary(&report).ends_with("[FAILURE] 1 module(s) failed"));
    }

    #[test]
    fn module_verdict_lines() {
        plain();
        assert_eq!(
            render_module_verdict("Report Module", true),
            "[PASS] Report Module test passed"
        );
        assert_eq!(
            render_module_verdict("File Upload Lifecycle", false),
            "[FAIL] File Upload Lifecycle test failed"
        );
    }

    #[test]
    fn banner_wraps_title() {
        plain();
        assert_eq!(
            render_module_banner("Data Source Module"),
            "\n==================== Data Source Module ===================="
        );
    }
}

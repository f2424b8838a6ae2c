//! Test runner: owns the API client, the poll policy and the report.
//!
//! Modules drive the runner through a handful of step helpers. Each helper
//! records exactly one check in the [`TestReport`] and prints it.

use serde_json::Value;
use tracing::{error, info};

use crate::client::{ApiClient, ApiRequest, ApiResponse};
use crate::config::TestConfig;
use crate::endpoints;
use crate::error::ApiError;
use crate::modules::{ModuleSelection, TestModule};
use crate::poller::{PollPolicy, TaskPoller};
use crate::report::TestReport;
use crate::summary;

/// Runs test modules against one API base URL.
pub struct TestRunner {
    client: ApiClient,
    config: TestConfig,
    policy: PollPolicy,
    report: TestReport,
    quiet: bool,
}

impl TestRunner {
    /// Build a runner whose poll policy comes from the config.
    pub fn new(config: TestConfig) -> Result<Self, ApiError> {
        let policy = config.polling.to_policy();
        Self::with_policy(config, policy)
    }

    /// Build a runner with an explicit poll policy.
    pub fn with_policy(config: TestConfig, policy: PollPolicy) -> Result<Self, ApiError> {
        let client = ApiClient::new(&config.api_base_url, config.request_timeout())?;
        Ok(Self {
            client,
            config,
            policy,
            report: TestReport::new(),
            quiet: false,
        })
    }

    /// Suppress step output on stdout. Steps are still recorded.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn report(&self) -> &TestReport {
        &self.report
    }

    pub fn into_report(self) -> TestReport {
        self.report
    }

    /// Run a module selection. Returns `true` when every selected module
    /// succeeded.
    pub async fn run(&mut self, selection: ModuleSelection) -> bool {
        if selection == ModuleSelection::All {
            return self.run_all().await;
        }
        let mut success = true;
        for module in selection.modules() {
            success &= self.run_module(module).await;
        }
        success
    }

    /// Run datasource, profiling, report and file in sequence, each under
    /// its own banner. A failing module never stops the next one.
    pub async fn run_all(&mut self) -> bool {
        let mut success = true;
        for module in ModuleSelection::ALL_MODULES {
            self.print(&summary::render_module_banner(module.title()));
            let passed = self.run_module(module).await;
            self.print(&summary::render_module_verdict(module.title(), passed));
            success &= passed;
        }
        success
    }

    /// Run one module and record its overall result.
    pub async fn run_module(&mut self, module: TestModule) -> bool {
        info!(module = module.name(), base_url = %self.client.base_url(), "running module");
        let success = match module.run(self).await {
            Ok(success) => success,
            Err(err) => {
                error!(
                    module = module.name(),
                    category = err.error_category(),
                    error = %err,
                    "module aborted"
                );
                false
            },
        };
        self.report.finish_module(module.name(), success);
        success
    }

    pub(crate) fn info(&self, message: &str) {
        self.print(&summary::render_info(message));
    }

    pub(crate) fn pass(&mut self, module: TestModule, name: impl Into<String>) {
        let line = summary::render_step(self.report.pass(module.name(), name));
        self.print(&line);
    }

    pub(crate) fn fail(&mut self, module: TestModule, name: impl Into<String>, details: Vec<String>) {
        let line = summary::render_step(self.report.fail(module.name(), name, details));
        self.print(&line);
    }

    fn print(&self, line: &str) {
        if !self.quiet {
            println!("{line}");
        }
    }

    pub(crate) fn sample_file_path(&self) -> &std::path::Path {
        &self.config.sample_file_path
    }

    /// Payload of the primary configured data source, or a recorded failure
    /// under `step` when none is configured.
    pub(crate) fn datasource_payload(&mut self, module: TestModule, step: &str) -> Option<Value> {
        match self.config.primary_datasource() {
            Ok(payload) => Some(payload.clone()),
            Err(err) => {
                self.fail(module, format!("{step} - {err}"), Vec::new());
                None
            },
        }
    }

    /// Send a request. A transport error is recorded as a failed step under
    /// `step` and returned so the module aborts.
    pub(crate) async fn send(
        &mut self,
        module: TestModule,
        step: &str,
        request: &ApiRequest,
    ) -> Result<ApiResponse, ApiError> {
        match self.client.send(request).await {
            Ok(response) => Ok(response),
            Err(err) => {
                let details = request.describe(self.client.base_url());
                self.fail(module, format!("{step} - Request failed: {err}"), details);
                Err(err)
            },
        }
    }

    /// Send a request and check its status code.
    ///
    /// Records `"{step} (Status: N)"` on a match. On a mismatch records
    /// `"{step} - Expected E, got N"` with the request and response details
    /// and returns `Ok(None)`.
    pub(crate) async fn expect_status(
        &mut self,
        module: TestModule,
        step: &str,
        request: &ApiRequest,
        expected: u16,
    ) -> Result<Option<ApiResponse>, ApiError> {
        let response = self.send(module, step, request).await?;
        if response.status == expected {
            self.pass(module, format!("{step} (Status: {})", response.status));
            return Ok(Some(response));
        }

        let mut details = request.describe(self.client.base_url());
        if !response.body.is_empty() {
            details.push(format!("Response: {}", response.body));
        }
        self.fail(
            module,
            format!("{step} - Expected {expected}, got {}", response.status),
            details,
        );
        Ok(None)
    }

    /// Like [`expect_status`](Self::expect_status), additionally requiring a
    /// non-empty `field` in the JSON body. Returns the field value.
    pub(crate) async fn expect_created(
        &mut self,
        module: TestModule,
        step: &str,
        request: &ApiRequest,
        field: &str,
    ) -> Result<Option<String>, ApiError> {
        let Some(response) = self.expect_status(module, step, request, 201).await? else {
            return Ok(None);
        };
        match response.string_field(field) {
            Some(value) => Ok(Some(value)),
            None => {
                let step_number = step.split(':').next().unwrap_or(step);
                self.fail(
                    module,
                    format!("{step_number}: No {field} in response"),
                    vec![format!("Response: {}", response.body)],
                );
                Ok(None)
            },
        }
    }

    /// Step 1 of the profiling and report modules: create the configured
    /// data source and return its `sourceId`.
    pub(crate) async fn create_datasource(
        &mut self,
        module: TestModule,
    ) -> Result<Option<String>, ApiError> {
        const STEP: &str = "Step 1: Create Data Source";
        let Some(payload) = self.datasource_payload(module, STEP) else {
            return Ok(None);
        };
        let request = ApiRequest::post_json(endpoints::DATASOURCES, payload);
        self.expect_created(module, STEP, &request, "sourceId").await
    }

    /// Step 2: start a profiling task named `task_name` over `source_id`
    /// and return its `taskId`.
    pub(crate) async fn start_profiling_task(
        &mut self,
        module: TestModule,
        source_id: &str,
        task_name: &str,
    ) -> Result<Option<String>, ApiError> {
        let request = ApiRequest::post_json(
            endpoints::PROFILING_TASKS,
            endpoints::profiling_request(source_id, task_name),
        );
        self.expect_created(module, "Step 2: Start Profiling Task", &request, "taskId")
            .await
    }

    /// Step 3: poll the task to a final outcome and record it as one check.
    pub(crate) async fn await_task(&mut self, module: TestModule, task_id: &str) -> bool {
        self.info(&format!("Waiting for task {task_id} to complete..."));
        let outcome = TaskPoller::new(&self.client, self.policy)
            .poll(task_id)
            .await;

        match outcome.failure_reason() {
            None => self.pass(module, "Step 3: Task completed successfully"),
            Some(reason) => self.fail(
                module,
                format!("Step 3: {reason}"),
                vec![format!("Attempts: {}", outcome.attempts())],
            ),
        }
        outcome.is_completed()
    }

    /// Steps 4 and 5 of the report and file modules: summary and detailed
    /// report queries.
    pub(crate) async fn query_reports(
        &mut self,
        module: TestModule,
        task_id: &str,
        source_id: &str,
    ) -> Result<bool, ApiError> {
        let summary = ApiRequest::get(endpoints::summary_report(task_id));
        let mut success = self
            .expect_status(module, "Step 4: Query Summary Report", &summary, 200)
            .await?
            .is_some();

        let detailed = ApiRequest::post_json(
            endpoints::detailed_report(task_id),
            endpoints::detailed_report_request(source_id),
        );
        success &= self
            .expect_status(module, "Step 5: Query Detailed Report", &detailed, 200)
            .await?
            .is_some();
        Ok(success)
    }

    /// Best-effort cleanup step. Recorded like any other check, but the
    /// caller does not fold it into the module result.
    pub(crate) async fn cleanup(
        &mut self,
        module: TestModule,
        step: &str,
        endpoint: String,
    ) -> Result<(), ApiError> {
        self.expect_status(module, step, &ApiRequest::delete(endpoint), 204)
            .await?;
        Ok(())
    }
}

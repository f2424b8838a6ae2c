//! Profiling task lifecycle: start, poll, delete.

use super::TestModule;
use crate::client::ApiRequest;
use crate::endpoints;
use crate::error::ApiError;
use crate::runner::TestRunner;

const MODULE: TestModule = TestModule::Profiling;
const TASK_NAME: &str = "Test Profiling Task";

pub(super) async fn run(runner: &mut TestRunner) -> Result<bool, ApiError> {
    runner.info("Running Profiling Module Test");

    let Some(source_id) = runner.create_datasource(MODULE).await? else {
        return Ok(false);
    };

    let success = match runner
        .start_profiling_task(MODULE, &source_id, TASK_NAME)
        .await?
    {
        Some(task_id) => {
            runner.info(&format!("Created profiling task {task_id}"));
            let mut success = runner.await_task(MODULE, &task_id).await;

            let delete = ApiRequest::delete(endpoints::profiling_task(&task_id));
            success &= runner
                .expect_status(MODULE, "Step 4: Delete Profiling Task", &delete, 204)
                .await?
                .is_some();
            success
        },
        None => false,
    };

    runner
        .cleanup(
            MODULE,
            "Cleanup: Delete Data Source",
            endpoints::datasource(&source_id),
        )
        .await?;

    Ok(success)
}

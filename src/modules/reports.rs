//! Report queries over a finished profiling task.

use super::TestModule;
use crate::endpoints;
use crate::error::ApiError;
use crate::runner::TestRunner;

const MODULE: TestModule = TestModule::Report;
const TASK_NAME: &str = "Test Report Task";

pub(super) async fn run(runner: &mut TestRunner) -> Result<bool, ApiError> {
    runner.info("Running Report Module Test");

    let Some(source_id) = runner.create_datasource(MODULE).await? else {
        return Ok(false);
    };

    let success = match runner
        .start_profiling_task(MODULE, &source_id, TASK_NAME)
        .await?
    {
        Some(task_id) => {
            let mut success = runner.await_task(MODULE, &task_id).await;
            if success {
                success = runner.query_reports(MODULE, &task_id, &source_id).await?;
            }

            runner
                .cleanup(
                    MODULE,
                    "Cleanup: Delete Profiling Task",
                    endpoints::profiling_task(&task_id),
                )
                .await?;
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

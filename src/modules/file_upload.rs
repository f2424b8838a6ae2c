//! File upload lifecycle: upload a sample file as a data source, profile
//! it, query its reports and delete it again.

use super::TestModule;
use crate::client::ApiRequest;
use crate::endpoints;
use crate::error::ApiError;
use crate::runner::TestRunner;

const MODULE: TestModule = TestModule::File;
const TASK_NAME: &str = "File Upload Lifecycle Test";

pub(super) async fn run(runner: &mut TestRunner) -> Result<bool, ApiError> {
    runner.info("Running File Upload Lifecycle Test");

    let sample = runner.sample_file_path().to_path_buf();
    if !sample.is_file() {
        runner.fail(
            MODULE,
            format!("Step 1: Sample file not found: {}", sample.display()),
            Vec::new(),
        );
        return Ok(false);
    }

    let upload = ApiRequest::upload(endpoints::FILE_UPLOAD, sample);
    let Some(source_id) = runner
        .expect_created(
            MODULE,
            "Step 1: Upload File and Create Data Source",
            &upload,
            "sourceId",
        )
        .await?
    else {
        return Ok(false);
    };
    runner.info(&format!("Uploaded file as data source {source_id}"));

    let mut success = match runner
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

    let delete = ApiRequest::delete(endpoints::datasource(&source_id));
    success &= runner
        .expect_status(MODULE, "Step 6: Delete Data Source", &delete, 204)
        .await?
        .is_some();

    let verify = ApiRequest::get(endpoints::datasource(&source_id));
    success &= runner
        .expect_status(MODULE, "Step 7: Verify Deletion", &verify, 404)
        .await?
        .is_some();

    Ok(success)
}

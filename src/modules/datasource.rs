//! Data source CRUD lifecycle.

use super::TestModule;
use crate::client::ApiRequest;
use crate::endpoints;
use crate::error::ApiError;
use crate::runner::TestRunner;

const MODULE: TestModule = TestModule::Datasource;

pub(super) async fn run(runner: &mut TestRunner) -> Result<bool, ApiError> {
    runner.info("Running Data Source Module Test");

    let Some(payload) = runner.datasource_payload(MODULE, "Step 1: Create Data Source") else {
        return Ok(false);
    };
    let create = ApiRequest::post_json(endpoints::DATASOURCES, payload.clone());
    let Some(source_id) = runner
        .expect_created(MODULE, "Step 1: Create Data Source", &create, "sourceId")
        .await?
    else {
        return Ok(false);
    };
    runner.info(&format!("Created data source {source_id}"));

    let mut success = true;

    let test = ApiRequest::post(endpoints::datasource_test(&source_id));
    success &= runner
        .expect_status(MODULE, "Step 2: Test Connection", &test, 200)
        .await?
        .is_some();

    let get = ApiRequest::get(endpoints::datasource(&source_id));
    success &= runner
        .expect_status(MODULE, "Step 3: Get Data Source", &get, 200)
        .await?
        .is_some();

    let updated = endpoints::renamed_payload(&payload);
    let expected_name = updated["name"].as_str().unwrap_or_default().to_string();
    let update = ApiRequest::put_json(endpoints::datasource(&source_id), updated);
    success &= runner
        .expect_status(MODULE, "Step 4: Update Data Source", &update, 200)
        .await?
        .is_some();

    match runner
        .expect_status(MODULE, "Step 5: Verify Update", &get, 200)
        .await?
    {
        Some(response) => {
            if response.string_field("name").as_deref() == Some(expected_name.as_str()) {
                runner.pass(MODULE, "Step 5: Name update verified");
            } else {
                runner.fail(
                    MODULE,
                    format!("Step 5: Name update not reflected, expected '{expected_name}'"),
                    vec![format!("Response: {}", response.body)],
                );
                success = false;
            }
        },
        None => success = false,
    }

    let delete = ApiRequest::delete(endpoints::datasource(&source_id));
    success &= runner
        .expect_status(MODULE, "Step 6: Delete Data Source", &delete, 204)
        .await?
        .is_some();

    success &= runner
        .expect_status(MODULE, "Step 7: Verify Deletion", &get, 404)
        .await?
        .is_some();

    Ok(success)
}

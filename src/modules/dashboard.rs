//! Dashboard aggregate queries. Read-only, so nothing to clean up.

use super::TestModule;
use crate::client::ApiRequest;
use crate::endpoints;
use crate::error::ApiError;
use crate::runner::TestRunner;

const MODULE: TestModule = TestModule::Dashboard;

const QUERIES: [(&str, &str); 3] = [
    ("Step 1: Query Dashboard Stats", endpoints::DASHBOARD_STATS),
    (
        "Step 2: Query Task Status Distribution",
        endpoints::DASHBOARD_TASK_STATUS,
    ),
    (
        "Step 3: Query Data Source Types",
        endpoints::DASHBOARD_DATASOURCE_TYPES,
    ),
];

pub(super) async fn run(runner: &mut TestRunner) -> Result<bool, ApiError> {
    runner.info("Running Dashboard Module Test");

    let mut success = true;
    for (step, endpoint) in QUERIES {
        let request = ApiRequest::get(endpoint);
        match runner.expect_status(MODULE, step, &request, 200).await? {
            Some(response) if response.json().is_err() => {
                runner.fail(
                    MODULE,
                    format!("{step} - Response is not JSON"),
                    vec![format!("Response: {}", response.body)],
                );
                success = false;
            },
            Some(_) => {},
            None => success = false,
        }
    }
    Ok(success)
}

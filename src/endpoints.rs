//! Endpoint paths and request payloads of the profiler API.
//!
//! Paths are relative to the configured base URL.

use serde_json::{json, Map, Value};

pub const DATASOURCES: &str = "/datasources";
pub const FILE_UPLOAD: &str = "/files/upload";
pub const PROFILING_TASKS: &str = "/profiling/profiling-tasks";
pub const DASHBOARD_STATS: &str = "/dashboard/stats";
pub const DASHBOARD_TASK_STATUS: &str = "/dashboard/task-status";
pub const DASHBOARD_DATASOURCE_TYPES: &str = "/dashboard/datasource-types";

/// Prefix prepended to a data source name by the update step.
pub const UPDATED_NAME_PREFIX: &str = "Updated ";

pub fn datasource(source_id: &str) -> String {
    format!("{DATASOURCES}/{source_id}")
}

pub fn datasource_test(source_id: &str) -> String {
    format!("{DATASOURCES}/{source_id}/test")
}

pub fn profiling_task(task_id: &str) -> String {
    format!("{PROFILING_TASKS}/{task_id}")
}

pub fn task_status(task_id: &str) -> String {
    format!("/profiling/task-status/{task_id}")
}

pub fn summary_report(task_id: &str) -> String {
    format!("/api/reports/{task_id}/summary")
}

pub fn detailed_report(task_id: &str) -> String {
    format!("/api/reports/{task_id}/detailed")
}

/// Body of `POST /profiling/profiling-tasks` profiling one whole data source.
pub fn profiling_request(source_id: &str, task_name: &str) -> Value {
    json!({
        "datasources": { source_id: {} },
        "taskName": task_name,
    })
}

/// Body of `POST /api/reports/{id}/detailed` scoped to one whole data source.
pub fn detailed_report_request(source_id: &str) -> Value {
    json!({
        "dataSources": { source_id: {} },
    })
}

/// Copy of a data source payload with its name prefixed by
/// [`UPDATED_NAME_PREFIX`].
///
/// A payload without a string `name` gets the bare prefix as its name.
pub fn renamed_payload(payload: &Value) -> Value {
    let mut fields = payload.as_object().cloned().unwrap_or_else(Map::new);
    let name = fields.get("name").and_then(Value::as_str).unwrap_or_default();
    let updated = format!("{UPDATED_NAME_PREFIX}{name}");
    fields.insert("name".to_string(), Value::String(updated));
    Value::Object(fields)
}

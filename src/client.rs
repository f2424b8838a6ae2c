//! HTTP client bound to the profiler API base URL.
//!
//! [`ApiRequest`] describes a request independently of sending it, so that a
//! failed assertion can print exactly what was sent. [`ApiClient`] sends
//! those descriptions and implements [`StatusSource`] for the task poller.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::endpoints;
use crate::error::ApiError;
use crate::poller::StatusSource;
use crate::status::TaskStatusSnapshot;

/// Content type sent for uploaded sample files.
const UPLOAD_MIME: &str = "text/csv";

/// Body of an [`ApiRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON body.
    Json(Value),
    /// Multipart upload of a single file under the `file` field.
    File(PathBuf),
}

/// A request against the API, described by method, endpoint and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint, RequestBody::Empty)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint, RequestBody::Empty)
    }

    /// `POST` without a body.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint, RequestBody::Empty)
    }

    pub fn post_json(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, endpoint, RequestBody::Json(body))
    }

    pub fn put_json(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, endpoint, RequestBody::Json(body))
    }

    pub fn upload(endpoint: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(Method::POST, endpoint, RequestBody::File(path.into()))
    }

    /// Indented diagnostic lines printed under a failed assertion.
    pub fn describe(&self, base_url: &str) -> Vec<String> {
        let mut lines = vec![
            format!("Request URL: {base_url}{}", self.endpoint),
            format!("Request Method: {}", self.method),
        ];
        match &self.body {
            RequestBody::Empty => {},
            RequestBody::Json(body) => {
                let pretty =
                    serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
                lines.push(format!("Request Body: {pretty}"));
            },
            RequestBody::File(path) => {
                lines.push(format!("Request Files: file={}", path.display()));
            },
        }
        lines
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.endpoint)
    }
}

/// Status code and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })
    }

    /// A top-level string field of the JSON body, if present and non-empty.
    ///
    /// Numeric ids are rendered as strings.
    pub fn string_field(&self, key: &str) -> Option<String> {
        let value = self.json().ok()?;
        match value.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// HTTP client for the profiler API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` with an optional per-request timeout.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| ApiError::Connection {
            message: format!("Failed to create HTTP client: {e}"),
        })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send a request and return whatever status the server answered with.
    ///
    /// Only transport failures and unreadable upload files are errors; a 4xx
    /// or 5xx answer is a normal [`ApiResponse`].
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url(&request.endpoint);
        debug!(method = %request.method, url = %url, "sending request");

        let builder = self.http.request(request.method.clone(), &url);
        let builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::File(path) => builder.multipart(upload_form(path).await?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::classify_reqwest(&e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::classify_reqwest(&e))?;

        debug!(method = %request.method, url = %url, status, "received response");
        Ok(ApiResponse { status, body })
    }
}

async fn upload_form(path: &Path) -> Result<Form, ApiError> {
    let upload_error = |message: String| ApiError::Upload {
        path: path.display().to_string(),
        message,
    };

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| upload_error(e.to_string()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_string());

    let part = Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(UPLOAD_MIME)
        .map_err(|e| upload_error(e.to_string()))?;
    Ok(Form::new().part("file", part))
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn fetch_status(&self, handle: &str) -> Result<TaskStatusSnapshot, ApiError> {
        let response = self
            .send(&ApiRequest::get(endpoints::task_status(handle)))
            .await?;
        if response.status != StatusCode::OK.as_u16() {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            });
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn describe_json_request() {
        let request = ApiRequest::post_json("/datasources", json!({"name": "pg"}));
        let lines = request.describe("http://localhost:8080");
        assert_eq!(lines[0], "Request URL: http://localhost:8080/datasources");
        assert_eq!(lines[1], "Request Method: POST");
        assert!(lines[2].starts_with("Request Body: {"));
        assert!(lines[2].contains("\"name\": \"pg\""));
    }

    #[test]
    fn describe_empty_request_has_two_lines() {
        let lines = ApiRequest::delete("/datasources/ds-1").describe("http://h");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn describe_upload_names_file() {
        let lines = ApiRequest::upload("/files/upload", "data/sample.csv").describe("http://h");
        assert_eq!(lines[2], "Request Files: file=data/sample.csv");
    }

    #[test]
    fn display_is_method_and_endpoint() {
        assert_eq!(
            ApiRequest::get("/datasources/7").to_string(),
            "GET /datasources/7"
        );
    }

    #[test]
    fn string_field_reads_strings_and_numbers() {
        let response = ApiResponse {
            status: 201,
            body: r#"{"sourceId": "ds-1", "id": 42, "name": ""}"#.to_string(),
        };
        assert_eq!(response.string_field("sourceId").as_deref(), Some("ds-1"));
        assert_eq!(response.string_field("id").as_deref(), Some("42"));
        assert_eq!(response.string_field("name"), None);
        assert_eq!(response.string_field("taskId"), None);
    }

    #[test]
    fn string_field_on_non_json_body_is_none() {
        let response = ApiResponse {
            status: 500,
            body: "Internal Server Error".to_string(),
        };
        assert!(response.json().is_err());
        assert_eq!(response.string_field("sourceId"), None);
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:8080/api/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(
            client.url("/datasources"),
            "http://localhost:8080/api/datasources"
        );
    }
}

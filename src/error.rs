//! Error types for the integration test runner.
//!
//! Defines [`ConfigError`] for configuration loading and validation, and
//! [`ApiError`] for transport and protocol errors encountered while talking
//! to the profiler API.

/// Errors that occur while loading or validating the test configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read from disk.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        source: std::io::Error,
        path: String,
    },

    /// The config file is not valid JSON or does not match the expected schema.
    #[error("Invalid JSON in config file: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },

    /// The config parsed but contains invalid values.
    #[error("Config validation error: {message}")]
    Validation { message: String },
}

/// Transport and protocol errors encountered while calling the API.
///
/// Each variant is a distinct category so that callers can report them
/// separately. None of them is retried by the task poller.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a status code the caller did not expect.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request exceeded the configured per-request timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection-level failure (DNS resolution, TCP connect, TLS handshake).
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// The response body could not be decoded as the expected JSON.
    #[error("Invalid response body: {message}")]
    Decode { message: String },

    /// A file to upload could not be read.
    #[error("Failed to read upload file '{path}': {message}")]
    Upload { path: String, message: String },
}

impl ApiError {
    /// Returns the error category as a static string for reporting.
    ///
    /// Categories: `"http"`, `"timeout"`, `"connection"`, `"decode"`, `"upload"`.
    pub fn error_category(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Timeout => "timeout",
            Self::Connection { .. } => "connection",
            Self::Decode { .. } => "decode",
            Self::Upload { .. } => "upload",
        }
    }

    /// Classify a [`reqwest::Error`] into the appropriate [`ApiError`] variant.
    pub fn classify_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection {
                message: err.to_string(),
            }
        } else if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            Self::Connection {
                message: err.to_string(),
            }
        }
    }
}

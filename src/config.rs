//! JSON test configuration.
//!
//! The runner reads a single JSON file supplying the API base URL, sample
//! data source payloads, the sample file used by the upload lifecycle, and
//! polling settings.
//!
//! # Example
//!
//! ```json
//! {
//!   "api_base_url": "http://localhost:8080/api",
//!   "test_data_sources": [
//!     {
//!       "name": "MySQL test database",
//!       "payload": {
//!         "name": "Test MySQL",
//!         "type": "MYSQL",
//!         "properties": { "host": "localhost", "port": "3306" }
//!       }
//!     }
//!   ],
//!   "sample_file_path": "sample_data.csv",
//!   "polling": { "max_attempts": 30, "interval_ms": 2000 },
//!   "request_timeout_secs": 30
//! }
//! ```
//!
//! Every field except the data source list has a default. The data source
//! list is only checked when a module needs it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::poller::{PollPolicy, DEFAULT_MAX_ATTEMPTS};

/// Base URL used when the config does not name one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Top-level test configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub api_base_url: String,
    /// Sample data source definitions. The first one is used by the modules.
    #[serde(default)]
    pub test_data_sources: Vec<DataSourceFixture>,
    /// File uploaded by the file lifecycle module.
    #[serde(default = "default_sample_file")]
    pub sample_file_path: PathBuf,
    /// Task polling settings.
    #[serde(default)]
    pub polling: PollingSettings,
    /// Per-request timeout. `None` leaves the HTTP client default in place.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// A named data source creation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceFixture {
    /// Human label for the fixture (not sent to the server).
    #[serde(default)]
    pub name: Option<String>,
    /// JSON body of `POST /datasources`.
    pub payload: Value,
}

/// Attempt budget and delay for task status polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingSettings {
    /// Maximum number of status queries per task.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay between status queries in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl PollingSettings {
    /// Convert to the poller's policy type.
    pub fn to_policy(self) -> PollPolicy {
        PollPolicy::new(self.max_attempts, Duration::from_millis(self.interval_ms))
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_sample_file() -> PathBuf {
    PathBuf::from("sample_data.csv")
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_interval_ms() -> u64 {
    2000
}

impl TestConfig {
    /// Parse and validate a config from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(content)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a file path.
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if the JSON is malformed, or
    /// [`ConfigError::Validation`] if validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            source,
            path: path.display().to_string(),
        })?;
        Self::from_json(&content)
    }

    /// Replace the base URL, e.g. from a CLI flag, and re-validate.
    pub fn set_base_url(&mut self, url: impl Into<String>) -> Result<(), ConfigError> {
        self.api_base_url = url.into();
        self.normalize();
        self.validate()
    }

    /// Validate semantic constraints.
    ///
    /// Checks:
    /// - `api_base_url` is an absolute `http`/`https` URL
    /// - `polling.max_attempts` is at least 1
    /// - every data source payload is a JSON object
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.api_base_url).map_err(|e| ConfigError::Validation {
            message: format!("api_base_url '{}' is not a valid URL: {e}", self.api_base_url),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                message: format!(
                    "api_base_url must use http or https, got '{}'",
                    parsed.scheme()
                ),
            });
        }

        if self.polling.max_attempts == 0 {
            return Err(ConfigError::Validation {
                message: "polling.max_attempts must be at least 1".to_string(),
            });
        }

        for (i, fixture) in self.test_data_sources.iter().enumerate() {
            if !fixture.payload.is_object() {
                return Err(ConfigError::Validation {
                    message: format!("test_data_sources[{i}].payload must be a JSON object"),
                });
            }
        }

        Ok(())
    }

    /// Payload of the first configured data source.
    pub fn primary_datasource(&self) -> Result<&Value, ConfigError> {
        self.test_data_sources
            .first()
            .map(|fixture| &fixture.payload)
            .ok_or_else(|| ConfigError::Validation {
                message: "test_data_sources must contain at least one entry".to_string(),
            })
    }

    /// Per-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    // Endpoint paths start with '/', so a trailing slash would double up.
    fn normalize(&mut self) {
        while self.api_base_url.ends_with('/') {
            self.api_base_url.pop();
        }
    }
}

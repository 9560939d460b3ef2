//! Client configuration

use std::time::Duration;

/// Default chat endpoint, matching the local development proxy setup.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/chat";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for the chat transport
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Full URL of the chat completion endpoint
    pub endpoint: String,
    /// Deadline applied to the whole request, including the streamed body
    pub request_timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ChatConfig {
    /// Read configuration from the environment.
    ///
    /// Reads: `FINBOT_API_URL`, `FINBOT_REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("FINBOT_API_URL")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            request_timeout: std::env::var("FINBOT_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
        }
    }
}

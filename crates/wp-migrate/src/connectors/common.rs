//! Common utilities shared across connectors.
//!
//! HTTP client creation, URL validation and error mapping.

use crate::error::{Error, Result};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

/// Default HTTP timeout for all connectors.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates a configured HTTP client with timeout.
#[must_use]
pub fn create_http_client() -> Client {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!("wp-migrate/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Validates a URL for safety (anti-SSRF).
pub fn validate_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url)
        .map_err(|e| Error::Config(format!("Invalid URL format '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::Config(format!(
                "Invalid URL scheme '{}' in '{}'. Allowed: http, https",
                other, url
            )))
        }
    }

    if parsed.host_str().is_none() {
        return Err(Error::Config(format!("URL has no host: {}", url)));
    }

    Ok(())
}

/// Detects the JSON type as a string for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Null => "null",
    }
}

/// Handles HTTP error responses and returns appropriate errors.
///
/// `fallback` builds the error for statuses without a dedicated variant.
pub fn handle_http_error(
    status_code: u16,
    body: &str,
    source_name: &str,
    fallback: fn(String) -> Error,
) -> Error {
    match status_code {
        429 => Error::RateLimit(60), // Default 60s retry
        401 | 403 => Error::Authentication(format!("{} auth failed: {}", source_name, body)),
        _ => fallback(format!("{} error {}: {}", source_name, status_code, body)),
    }
}

/// Reads the body of a failed response for error reporting.
pub async fn error_body(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string())
}

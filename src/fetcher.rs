use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::ApiConfig;
use crate::models::DownloadConfig;
use crate::utils::error::AppError;

/// Failure reported by a fetch collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Human readable failure message.
    #[error("{0}")]
    Message(String),
    /// The collaborator failed with something that is not a message.
    #[error("malformed failure: {0}")]
    Malformed(Value),
}

/// Fetches and scrapes a single URL.
///
/// Implementations own every side effect of a fetch (browser sessions,
/// cookies, timeouts). The success value is the raw payload; it is checked
/// for shape by the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, options: &DownloadConfig) -> Result<Value, FetchError>;
}

#[derive(Debug, Serialize)]
struct SearchRequestBody<'a> {
    url: &'a str,
    sitename: &'a str,
    options: Value,
}

/// [`Fetcher`] backed by the remote scraping API.
pub struct ApiFetcher {
    client: reqwest::Client,
    config: ApiConfig,
}

impl ApiFetcher {
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/search/", self.config.base_url.trim_end_matches('/'))
    }

    fn failure_from_body(status: reqwest::StatusCode, body: &str) -> FetchError {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::String(message)) => FetchError::Message(message),
            Ok(Value::Object(map)) => {
                let message = ["detail", "error_msg", "error"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_str))
                    .map(str::to_string);
                match message {
                    Some(message) => FetchError::Message(message),
                    None => FetchError::Malformed(Value::Object(map)),
                }
            }
            Ok(other) => FetchError::Malformed(other),
            Err(_) if body.trim().is_empty() => FetchError::Message(format!("HTTP {}", status)),
            Err(_) => FetchError::Message(format!("HTTP {}: {}", status, body.trim())),
        }
    }
}

#[async_trait]
impl Fetcher for ApiFetcher {
    async fn fetch(&self, url: &str, options: &DownloadConfig) -> Result<Value, FetchError> {
        if url.is_empty() {
            return Err(FetchError::Message("url is required.".to_string()));
        }

        let body = SearchRequestBody {
            url,
            sitename: &self.config.sitename,
            options: options.to_options(),
        };
        let timeout = self.config.timeout_for(&self.config.sitename);

        debug!(url, endpoint = %self.endpoint(), timeout_secs = timeout.as_secs(), "Calling fetch API");

        let response = self
            .client
            .post(self.endpoint())
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| FetchError::Message(format!("Fetch API request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Message(format!("Failed to read fetch API response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::failure_from_body(status, &text));
        }

        // Non-JSON bodies are handed on as strings and reported as unexpected payloads.
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn fetcher(base_url: &str) -> ApiFetcher {
        ApiFetcher::new(ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        assert_eq!(
            fetcher("http://localhost:8060/api/").endpoint(),
            "http://localhost:8060/api/search/"
        );
        assert_eq!(
            fetcher("http://localhost:8060/api").endpoint(),
            "http://localhost:8060/api/search/"
        );
    }

    #[test]
    fn test_failure_with_detail_message() {
        let failure = ApiFetcher::failure_from_body(
            StatusCode::BAD_GATEWAY,
            r#"{"detail": "timeout"}"#,
        );
        assert_eq!(failure, FetchError::Message("timeout".to_string()));
    }

    #[test]
    fn test_failure_with_structured_body_is_malformed() {
        let failure = ApiFetcher::failure_from_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": {"code": 7}}"#,
        );
        assert_eq!(failure, FetchError::Malformed(json!({"detail": {"code": 7}})));
    }

    #[test]
    fn test_failure_with_plain_text_body() {
        let failure = ApiFetcher::failure_from_body(StatusCode::SERVICE_UNAVAILABLE, "overloaded\n");
        assert_eq!(
            failure,
            FetchError::Message("HTTP 503 Service Unavailable: overloaded".to_string())
        );

        let failure = ApiFetcher::failure_from_body(StatusCode::NOT_FOUND, "");
        assert_eq!(failure, FetchError::Message("HTTP 404 Not Found".to_string()));
    }

    #[tokio::test]
    async fn test_empty_url_rejected_without_request() {
        let fetcher = fetcher("http://127.0.0.1:9/api/");
        let result = fetcher.fetch("", &DownloadConfig::default()).await;
        assert_eq!(result, Err(FetchError::Message("url is required.".to_string())));
    }
}

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use url::Url;
use validator::{Validate, ValidationError};

use crate::models::DownloadConfig;
use crate::url_generator::resolve_encoding;
use crate::utils::error::AppError;

pub const DEFAULT_QUERY_ENCODING: &str = "utf-8";

fn default_query_encoding() -> String {
    DEFAULT_QUERY_ENCODING.to_string()
}

/// Saved recipe for turning keywords into site search URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LabelConfig {
    /// Assigned by the store; `None` until persisted.
    #[serde(default)]
    pub id: Option<i64>,

    #[validate(length(min = 1, message = "label_name must not be empty"))]
    pub label_name: String,

    #[validate(custom(function = "validate_base_url"))]
    pub base_url: String,

    /// Query parameter key, e.g. `q` or `keyword`.
    #[validate(custom(function = "validate_query_key"))]
    pub query: String,

    #[serde(default = "default_query_encoding")]
    #[validate(custom(function = "validate_query_encoding"))]
    pub query_encoding: String,

    #[serde(flatten)]
    pub download: DownloadConfig,
}

impl LabelConfig {
    pub fn new(
        label_name: impl Into<String>,
        base_url: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            label_name: label_name.into(),
            base_url: base_url.into(),
            query: query.into(),
            query_encoding: default_query_encoding(),
            download: DownloadConfig::default(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.query_encoding = encoding.into();
        self
    }

    pub fn with_download(mut self, download: DownloadConfig) -> Self {
        self.download = download;
        self
    }

    /// Strip `?` and `=` from a query key typed into the registration form.
    pub fn sanitize_query(query: &str) -> String {
        query.replace(['?', '='], "")
    }

    pub fn ensure_valid(&self) -> Result<(), AppError> {
        self.validate()?;
        Ok(())
    }
}

fn invalid(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message));
    error
}

pub(crate) fn validate_base_url(base_url: &str) -> Result<(), ValidationError> {
    let parsed = Url::parse(base_url)
        .map_err(|e| invalid("base_url", format!("Invalid base_url {}: {}", base_url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(
            "base_url_scheme",
            format!("Invalid base_url {}: scheme must be http or https", base_url),
        ));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid(
            "base_url_host",
            format!("Invalid base_url {}: missing host", base_url),
        ));
    }
    Ok(())
}

fn validate_query_key(query: &str) -> Result<(), ValidationError> {
    if query.contains(['?', '=']) {
        return Err(invalid(
            "query",
            format!("query key {:?} must not contain '?' or '='", query),
        ));
    }
    Ok(())
}

fn validate_query_encoding(encoding: &str) -> Result<(), ValidationError> {
    resolve_encoding(encoding)
        .map(|_| ())
        .map_err(|e| invalid("query_encoding", e.to_string()))
}

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::models::{DownloadConfig, PatternType};
use crate::utils::error::AppError;

/// Saved recipe for recognising and scraping one product page layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_url_pattern"))]
pub struct ProductPageConfig {
    #[serde(default)]
    pub id: Option<i64>,

    #[validate(length(min = 1, message = "label_name must not be empty"))]
    pub label_name: String,

    #[validate(length(min = 1, message = "url_pattern must not be empty"))]
    pub url_pattern: String,

    #[serde(default)]
    pub pattern_type: PatternType,

    #[serde(flatten)]
    pub download: DownloadConfig,
}

impl ProductPageConfig {
    pub fn prefix(label_name: impl Into<String>, url_pattern: impl Into<String>) -> Self {
        Self::with_pattern(label_name, url_pattern, PatternType::Prefix)
    }

    pub fn regex(label_name: impl Into<String>, url_pattern: impl Into<String>) -> Self {
        Self::with_pattern(label_name, url_pattern, PatternType::Regex)
    }

    fn with_pattern(
        label_name: impl Into<String>,
        url_pattern: impl Into<String>,
        pattern_type: PatternType,
    ) -> Self {
        Self {
            id: None,
            label_name: label_name.into(),
            url_pattern: url_pattern.into(),
            pattern_type,
            download: DownloadConfig::default(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_download(mut self, download: DownloadConfig) -> Self {
        self.download = download;
        self
    }

    /// Compile `url_pattern` as a regex anchored at the start of the URL.
    pub fn anchored_regex(&self) -> Result<Regex, AppError> {
        Regex::new(&format!("^(?:{})", self.url_pattern)).map_err(|source| AppError::Regex {
            pattern: self.url_pattern.clone(),
            source,
        })
    }

    pub fn ensure_valid(&self) -> Result<(), AppError> {
        self.validate()?;
        Ok(())
    }
}

fn validate_url_pattern(config: &ProductPageConfig) -> Result<(), ValidationError> {
    if config.pattern_type != PatternType::Regex {
        return Ok(());
    }
    config.anchored_regex().map(|_| ()).map_err(|e| {
        let mut error = ValidationError::new("url_pattern");
        error.message = Some(Cow::Owned(e.to_string()));
        error
    })
}

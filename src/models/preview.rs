use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::download::json_kind;
use crate::models::{DownloadConfig, LabelConfig, ProductPageConfig};
use crate::utils::error::AppError;

/// One item scraped from a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub title: Option<String>,
    pub price: Option<i64>,
    pub taxin: bool,
    pub condition: Option<String>,
    pub on_sale: bool,
    pub salename: Option<String>,
    pub is_success: bool,
    pub url: Option<String>,
    pub sitename: Option<String>,
    pub image_url: Option<String>,
    pub stock_msg: Option<String>,
    pub stock_quantity: Option<i64>,
    pub sub_urls: Option<Vec<String>>,
    pub shops_with_stock: Option<String>,
    pub others: Option<Map<String, Value>>,
}

/// Result of fetching one URL: scraped items or an error message, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FetchOutcome {
    #[serde(rename = "results")]
    Success(Vec<SearchResult>),
    #[serde(rename = "error_msg")]
    Error(String),
}

#[derive(Debug, Deserialize)]
struct ResultsPayload {
    // Missing or null means the page had no hits.
    #[serde(default)]
    results: Option<Vec<SearchResult>>,
    #[serde(default)]
    error_msg: Option<String>,
}

impl FetchOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        FetchOutcome::Error(message.into())
    }

    /// Interpret a payload returned by the fetch collaborator.
    ///
    /// An object with a non-empty `error_msg` is an error. Any other object
    /// whose `results` is absent, null or a well-formed array is a success.
    /// Everything else is reported as an unexpected payload.
    pub fn from_payload(payload: Value) -> Self {
        if let Value::Object(_) = &payload {
            if let Ok(parsed) = serde_json::from_value::<ResultsPayload>(payload.clone()) {
                return match parsed {
                    ResultsPayload {
                        error_msg: Some(message),
                        ..
                    } if !message.is_empty() => FetchOutcome::Error(message),
                    ResultsPayload { results, .. } => FetchOutcome::Success(results.unwrap_or_default()),
                };
            }
        }
        FetchOutcome::Error(format!(
            "unexpected payload type: {}, value: {}",
            json_kind(&payload),
            payload
        ))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FetchOutcome::Error(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchOutcome::Error(message) => Some(message),
            FetchOutcome::Success(_) => None,
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        match self {
            FetchOutcome::Success(results) => results,
            FetchOutcome::Error(_) => &[],
        }
    }
}

/// The configuration entity a preview runs against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewSource {
    Label(LabelConfig),
    ProductPage(ProductPageConfig),
}

/// A batch of URLs to fetch with one download configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRequest {
    /// Fetched first when present.
    #[serde(default)]
    pub learning_url: Option<String>,
    #[serde(default)]
    pub target_urls: Vec<String>,
    /// Expanded through the label's query pattern; ignored for product pages.
    #[serde(default)]
    pub keywords: Vec<String>,
    pub source: PreviewSource,
}

impl PreviewRequest {
    pub fn for_label(label: LabelConfig) -> Self {
        Self::new(PreviewSource::Label(label))
    }

    pub fn for_product_page(page: ProductPageConfig) -> Self {
        Self::new(PreviewSource::ProductPage(page))
    }

    fn new(source: PreviewSource) -> Self {
        Self {
            learning_url: None,
            target_urls: Vec::new(),
            keywords: Vec::new(),
            source,
        }
    }

    pub fn with_learning_url(mut self, url: impl Into<String>) -> Self {
        self.learning_url = Some(url.into());
        self
    }

    pub fn with_target_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_urls.extend(urls.into_iter().map(Into::into));
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn download(&self) -> &DownloadConfig {
        match &self.source {
            PreviewSource::Label(label) => &label.download,
            PreviewSource::ProductPage(page) => &page.download,
        }
    }

    pub fn label_name(&self) -> &str {
        match &self.source {
            PreviewSource::Label(label) => &label.label_name,
            PreviewSource::ProductPage(page) => &page.label_name,
        }
    }

    pub fn ensure_valid(&self) -> Result<(), AppError> {
        match &self.source {
            PreviewSource::Label(label) => label.ensure_valid(),
            PreviewSource::ProductPage(page) => page.ensure_valid(),
        }
    }
}

/// Outcomes keyed by URL, in the order the URLs were first seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub results: IndexMap<String, FetchOutcome>,
}

impl PreviewResponse {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, url: &str) -> Option<&FetchOutcome> {
        self.results.get(url)
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    pub fn error_count(&self) -> usize {
        self.results.values().filter(|o| o.is_error()).count()
    }
}

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::ConfigLookup;
use crate::fetcher::Fetcher;
use crate::models::{FetchOutcome, PreviewRequest, PreviewResponse, ProductPageConfig};
use crate::orchestrator::resolve_and_fetch;
use crate::resolver::PatternResolver;
use crate::utils::error::{AppError, Result};

/// Outcome of a single-keyword search, keyed by label id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchByLabelResponse {
    pub results: IndexMap<i64, FetchOutcome>,
}

/// Run one keyword through a saved label and return the first outcome.
///
/// The map is empty when the keyword produced no URL.
pub async fn search_by_label<L, F>(
    lookup: &L,
    fetcher: &F,
    label_id: i64,
    keyword: &str,
) -> Result<SearchByLabelResponse>
where
    L: ConfigLookup + ?Sized,
    F: Fetcher + ?Sized,
{
    let label = lookup
        .label_by_id(label_id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource: format!("label {}", label_id),
        })?;

    let request = PreviewRequest::for_label(label).with_keywords([keyword]);
    let response = resolve_and_fetch(&request, fetcher).await?;

    let mut results = IndexMap::new();
    if let Some((url, outcome)) = response.results.into_iter().next() {
        debug!(label_id, %url, "Search by label fetched");
        results.insert(label_id, outcome);
    }
    Ok(SearchByLabelResponse { results })
}

/// Entry point tying the catalog and the fetch collaborator together.
pub struct SearchManager {
    fetcher: Arc<dyn Fetcher>,
    lookup: Arc<dyn ConfigLookup>,
}

impl SearchManager {
    pub fn new(fetcher: Arc<dyn Fetcher>, lookup: Arc<dyn ConfigLookup>) -> Self {
        Self { fetcher, lookup }
    }

    pub async fn preview(&self, request: &PreviewRequest) -> Result<PreviewResponse> {
        resolve_and_fetch(request, self.fetcher.as_ref()).await
    }

    pub async fn search_by_label(&self, label_id: i64, keyword: &str) -> Result<SearchByLabelResponse> {
        search_by_label(self.lookup.as_ref(), self.fetcher.as_ref(), label_id, keyword).await
    }

    /// Preview a saved label against explicit URLs and a set of keywords.
    /// Explicit URLs are fetched before the keyword URLs.
    pub async fn preview_label(
        &self,
        label_id: i64,
        urls: &[String],
        keywords: &[String],
    ) -> Result<PreviewResponse> {
        let label = self
            .lookup
            .label_by_id(label_id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                resource: format!("label {}", label_id),
            })?;
        let request = PreviewRequest::for_label(label)
            .with_target_urls(urls.iter().cloned())
            .with_keywords(keywords.iter().cloned());
        self.preview(&request).await
    }

    /// Preview a saved product page config against explicit URLs.
    pub async fn preview_product_page(&self, page_id: i64, urls: &[String]) -> Result<PreviewResponse> {
        let page = self
            .lookup
            .product_page_by_id(page_id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                resource: format!("product page {}", page_id),
            })?;
        let request = PreviewRequest::for_product_page(page).with_target_urls(urls.iter().cloned());
        self.preview(&request).await
    }

    /// Find the saved product page config responsible for `url`.
    pub async fn resolve_url(&self, url: &str) -> Result<Option<ProductPageConfig>> {
        let resolver = PatternResolver::new(self.lookup.product_pages().await?);
        if !resolver.rejected().is_empty() {
            info!(
                rejected = resolver.rejected().len(),
                "Some product page patterns were skipped"
            );
        }
        Ok(resolver.find_best_match(url).cloned())
    }
}

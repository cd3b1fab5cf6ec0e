use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::fetcher::{FetchError, Fetcher};
use crate::models::download::json_kind;
use crate::models::{DownloadConfig, FetchOutcome, PreviewRequest, PreviewResponse, PreviewSource};
use crate::url_generator::label_target_urls;
use crate::utils::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecreateState {
    /// No fetch has been attempted in this batch yet.
    FirstUse,
    /// At least one fetch has been attempted; parser state is reused.
    Reused,
}

/// Hands out download options so that `recreate_parser` is honoured at most
/// once per batch.
///
/// The first call returns the submitted config unchanged. Later calls return a
/// copy with `recreate_parser` turned off when the submitted config had it on,
/// and the submitted config otherwise.
#[derive(Debug, Clone)]
pub struct RecreatePolicy {
    state: RecreateState,
    original: DownloadConfig,
    reuse: Option<DownloadConfig>,
}

impl RecreatePolicy {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            state: RecreateState::FirstUse,
            original: config.clone(),
            reuse: config
                .recreate_parser()
                .then(|| config.with_recreate_parser(false)),
        }
    }

    pub fn state(&self) -> RecreateState {
        self.state
    }

    pub fn has_override(&self) -> bool {
        self.reuse.is_some()
    }

    /// Options for the next fetch attempt.
    pub fn next_options(&mut self) -> &DownloadConfig {
        match self.state {
            RecreateState::FirstUse => {
                self.state = RecreateState::Reused;
                &self.original
            }
            RecreateState::Reused => self.reuse.as_ref().unwrap_or(&self.original),
        }
    }
}

/// Ordered candidate URLs for a request: learning URL, explicit targets, then
/// keyword URLs (labels only). Duplicates are kept; the fetch loop skips them.
pub fn candidate_urls(request: &PreviewRequest) -> Result<Vec<String>> {
    let mut urls = Vec::with_capacity(1 + request.target_urls.len() + request.keywords.len());
    if let Some(learning_url) = request.learning_url.as_ref().filter(|u| !u.is_empty()) {
        urls.push(learning_url.clone());
    }
    urls.extend(request.target_urls.iter().cloned());

    if let PreviewSource::Label(label) = &request.source {
        if !request.keywords.is_empty() {
            urls.extend(label_target_urls(label, &request.keywords)?);
        }
    }
    Ok(urls)
}

/// Fetch every distinct candidate URL of `request`, one at a time, and collect
/// the outcomes keyed by URL.
///
/// Fetches run sequentially so the first attempt can rebuild parser state
/// before later attempts reuse it. Only request validation fails the call;
/// fetch failures are recorded against their URL and the batch continues.
pub async fn resolve_and_fetch<F>(request: &PreviewRequest, fetcher: &F) -> Result<PreviewResponse>
where
    F: Fetcher + ?Sized,
{
    request.ensure_valid()?;
    let candidates = candidate_urls(request)?;

    let request_id = Uuid::new_v4();
    let span = info_span!("preview", %request_id, label = request.label_name());

    async move {
        let mut policy = RecreatePolicy::new(request.download());
        let mut response = PreviewResponse::default();

        info!(
            candidates = candidates.len(),
            recreate_override = policy.has_override(),
            "Starting preview batch"
        );

        for url in candidates {
            if response.results.contains_key(&url) {
                debug!(%url, "Skipping duplicate URL");
                continue;
            }

            let options = policy.next_options();
            debug!(%url, recreate_parser = options.recreate_parser(), "Fetching");

            let outcome = match fetcher.fetch(&url, options).await {
                Ok(payload) => FetchOutcome::from_payload(payload),
                Err(FetchError::Message(message)) => {
                    warn!(%url, error = %message, "Fetch failed");
                    FetchOutcome::Error(message)
                }
                Err(FetchError::Malformed(value)) => {
                    warn!(%url, "Fetch failed with a malformed error value");
                    FetchOutcome::Error(format!(
                        "unexpected failure type: {}, value: {}",
                        json_kind(&value),
                        value
                    ))
                }
            };
            response.results.insert(url, outcome);
        }

        info!(
            fetched = response.len(),
            errors = response.error_count(),
            "Preview batch finished"
        );
        Ok(response)
    }
    .instrument(span)
    .await
}

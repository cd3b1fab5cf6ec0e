use regex::Regex;
use tracing::{debug, warn};

use crate::models::{PatternType, ProductPageConfig};

/// A catalog entry whose regex failed to compile and was left out.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedPattern {
    pub id: Option<i64>,
    pub url_pattern: String,
    pub reason: String,
}

/// Resolves an observed URL to the product page config that owns it.
///
/// Entries are ordered by ascending id (entries without an id last, in catalog
/// order). Prefix entries are tried first and the longest matching prefix wins,
/// ties going to the lowest id. Regex entries are only consulted when no prefix
/// matches, and the first one matching from the start of the URL wins.
#[derive(Debug, Clone, Default)]
pub struct PatternResolver {
    prefixes: Vec<ProductPageConfig>,
    regexes: Vec<(Regex, ProductPageConfig)>,
    rejected: Vec<RejectedPattern>,
}

impl PatternResolver {
    pub fn new(catalog: impl IntoIterator<Item = ProductPageConfig>) -> Self {
        let mut entries: Vec<ProductPageConfig> = catalog.into_iter().collect();
        entries.sort_by_key(|entry| (entry.id.is_none(), entry.id));

        let mut resolver = Self::default();
        for entry in entries {
            match entry.pattern_type {
                PatternType::Prefix => resolver.prefixes.push(entry),
                PatternType::Regex => match entry.anchored_regex() {
                    Ok(regex) => resolver.regexes.push((regex, entry)),
                    Err(e) => {
                        warn!(
                            id = ?entry.id,
                            label = %entry.label_name,
                            pattern = %entry.url_pattern,
                            error = %e,
                            "Skipping product page config with invalid regex"
                        );
                        resolver.rejected.push(RejectedPattern {
                            id: entry.id,
                            url_pattern: entry.url_pattern.clone(),
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }
        resolver
    }

    pub fn find_best_match(&self, observed_url: &str) -> Option<&ProductPageConfig> {
        if let Some(entry) = self.longest_prefix(observed_url) {
            debug!(url = observed_url, id = ?entry.id, "Resolved by prefix");
            return Some(entry);
        }

        let entry = self
            .regexes
            .iter()
            .find(|(regex, _)| regex.is_match(observed_url))
            .map(|(_, entry)| entry);
        match entry {
            Some(entry) => debug!(url = observed_url, id = ?entry.id, "Resolved by regex"),
            None => debug!(url = observed_url, "No product page config matched"),
        }
        entry
    }

    fn longest_prefix(&self, observed_url: &str) -> Option<&ProductPageConfig> {
        let mut best: Option<&ProductPageConfig> = None;
        for entry in &self.prefixes {
            if !observed_url.starts_with(entry.url_pattern.as_str()) {
                continue;
            }
            // Strictly longer only, so equal lengths keep the lower id.
            if best.map_or(true, |b| entry.url_pattern.len() > b.url_pattern.len()) {
                best = Some(entry);
            }
        }
        best
    }

    pub fn rejected(&self) -> &[RejectedPattern] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.prefixes.len() + self.regexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One-shot resolution against a catalog slice.
pub fn find_best_match(observed_url: &str, catalog: &[ProductPageConfig]) -> Option<ProductPageConfig> {
    PatternResolver::new(catalog.iter().cloned())
        .find_best_match(observed_url)
        .cloned()
}

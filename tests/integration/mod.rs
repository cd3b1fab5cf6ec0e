// Integration tests for ex-search
// These tests drive the preview pipeline against a mock fetch API

pub mod fetch_api_tests;
pub mod preview_flow_tests;
pub mod search_tests;

use std::io::Write;
use std::sync::Arc;

use ex_search::{
    config::ApiConfig,
    models::{DownloadConfig, DownloadMode, LabelConfig, ProductPageConfig},
    ApiFetcher, SearchManager, StaticCatalog,
};
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use wiremock::MockServer;

/// API config pointing at a mock server.
pub fn get_test_api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: format!("{}/api/", server.uri()),
        sitename: "gemini".to_string(),
        timeout_secs: 5,
        sitename_timeouts: Default::default(),
        user_agent: "ExSearch-Test/1.0".to_string(),
    }
}

pub fn create_test_fetcher(server: &MockServer) -> anyhow::Result<ApiFetcher> {
    Ok(ApiFetcher::new(get_test_api_config(server))?)
}

/// Catalog with two labels and two product page configs.
pub fn create_test_catalog() -> StaticCatalog {
    let mut recreate = DownloadConfig::new(DownloadMode::None);
    recreate.common.recreate_parser = true;
    recreate.common.sitename = "books".to_string();

    StaticCatalog::new(
        vec![
            LabelConfig::new("books", "https://books.example.com/search", "q")
                .with_id(1)
                .with_download(recreate),
            LabelConfig::new("jp-games", "https://games.example.jp/find?cat=3", "kw")
                .with_id(2)
                .with_encoding("shift_jis"),
        ],
        vec![
            ProductPageConfig::prefix("items", "https://games.example.jp/items/").with_id(10),
            ProductPageConfig::regex("detail", r"https://books\.example\.com/p/\d+").with_id(11),
        ],
    )
}

/// Write a catalog document to a temporary file.
pub fn write_catalog_file(catalog: &Value) -> anyhow::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(catalog.to_string().as_bytes())?;
    Ok(file)
}

pub async fn create_test_manager(server: &MockServer) -> anyhow::Result<SearchManager> {
    let fetcher = create_test_fetcher(server)?;
    Ok(SearchManager::new(Arc::new(fetcher), Arc::new(create_test_catalog())))
}

/// Success body as returned by the fetch API.
pub fn results_body(titles: &[&str]) -> Value {
    let results: Vec<Value> = titles
        .iter()
        .map(|title| json!({"title": title, "price": 1000, "is_success": true}))
        .collect();
    json!({"results": results, "error_msg": ""})
}

use super::*;
use ex_search::models::{FetchOutcome, PreviewRequest};
use ex_search::{resolve_and_fetch, ConfigLookup};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockBuilder, ResponseTemplate};

fn search_mock(url: &str, recreate_parser: bool) -> MockBuilder {
    Mock::given(method("POST"))
        .and(path("/api/search/"))
        .and(body_partial_json(json!({
            "url": url,
            "options": {"recreate_parser": recreate_parser}
        })))
}

#[tokio::test]
async fn test_label_preview_recreates_parser_once() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    search_mock("https://books.example.com/search?q=seed", true)
        .respond_with(ResponseTemplate::new(200).set_body_json(results_body(&["Seed"])))
        .expect(1)
        .mount(&server)
        .await;
    search_mock("https://books.example.com/search?q=rust", false)
        .respond_with(ResponseTemplate::new(200).set_body_json(results_body(&["Rust"])))
        .expect(1)
        .mount(&server)
        .await;
    search_mock("https://books.example.com/search?q=tokio", false)
        .respond_with(ResponseTemplate::new(200).set_body_json(results_body(&["Tokio"])))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = create_test_fetcher(&server)?;
    let label = create_test_catalog_label(1).await?;
    let request = PreviewRequest::for_label(label)
        .with_learning_url("https://books.example.com/search?q=seed")
        .with_keywords(["rust", "tokio", "rust"]);

    let response = resolve_and_fetch(&request, &fetcher).await?;

    let urls: Vec<&str> = response.urls().collect();
    assert_eq!(
        urls,
        vec![
            "https://books.example.com/search?q=seed",
            "https://books.example.com/search?q=rust",
            "https://books.example.com/search?q=tokio",
        ]
    );
    assert_eq!(response.error_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_partial_failure_keeps_other_results() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    search_mock("https://games.example.jp/items/1", false)
        .respond_with(ResponseTemplate::new(200).set_body_json(results_body(&["One"])))
        .mount(&server)
        .await;
    search_mock("https://games.example.jp/items/2", false)
        .respond_with(ResponseTemplate::new(504).set_body_json(json!({"detail": "timeout"})))
        .mount(&server)
        .await;
    search_mock("https://games.example.jp/items/3", false)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [], "error_msg": "no parser"})))
        .mount(&server)
        .await;

    let fetcher = create_test_fetcher(&server)?;
    let page = ProductPageConfig::prefix("items", "https://games.example.jp/items/");
    let request = PreviewRequest::for_product_page(page).with_target_urls([
        "https://games.example.jp/items/1",
        "https://games.example.jp/items/2",
        "https://games.example.jp/items/3",
    ]);

    let response = resolve_and_fetch(&request, &fetcher).await?;

    assert_eq!(response.len(), 3);
    assert_eq!(
        response.get("https://games.example.jp/items/1").map(|o| o.results().len()),
        Some(1)
    );
    assert_eq!(
        response.get("https://games.example.jp/items/2"),
        Some(&FetchOutcome::error("timeout"))
    );
    assert_eq!(
        response.get("https://games.example.jp/items/3"),
        Some(&FetchOutcome::error("no parser"))
    );
    Ok(())
}

#[tokio::test]
async fn test_non_json_success_body_is_contract_violation() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let fetcher = create_test_fetcher(&server)?;
    let page = ProductPageConfig::prefix("items", "https://games.example.jp/items/");
    let request =
        PreviewRequest::for_product_page(page).with_target_urls(["https://games.example.jp/items/1"]);

    let response = resolve_and_fetch(&request, &fetcher).await?;

    let message = response
        .get("https://games.example.jp/items/1")
        .and_then(FetchOutcome::error_message)
        .unwrap_or_default();
    assert!(message.starts_with("unexpected payload type: string"));
    Ok(())
}

#[tokio::test]
async fn test_response_serializes_in_fetch_order() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_body(&[])))
        .mount(&server)
        .await;

    let fetcher = create_test_fetcher(&server)?;
    let page = ProductPageConfig::prefix("items", "https://games.example.jp/items/");
    let request = PreviewRequest::for_product_page(page)
        .with_target_urls(["https://games.example.jp/items/z", "https://games.example.jp/items/a"]);

    let response = resolve_and_fetch(&request, &fetcher).await?;
    let serialized = serde_json::to_string(&response)?;

    assert!(serialized.find("items/z").unwrap() < serialized.find("items/a").unwrap());
    assert!(serialized.contains(r#""results":[]"#));
    Ok(())
}

async fn create_test_catalog_label(id: i64) -> anyhow::Result<LabelConfig> {
    let catalog = create_test_catalog();
    catalog
        .label_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("label {} missing from test catalog", id))
}

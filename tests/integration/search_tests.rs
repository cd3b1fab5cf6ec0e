use super::*;
use ex_search::{search_by_label, AppError, ConfigLookup};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_search_by_label_with_shift_jis_keyword() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search/"))
        .and(body_partial_json(json!({
            "url": "https://games.example.jp/find?cat=3&kw=%83Q%81%5B%83%80"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_body(&["Game"])))
        .expect(1)
        .mount(&server)
        .await;

    let manager = create_test_manager(&server).await?;
    let response = manager.search_by_label(2, "ゲーム").await?;

    assert_eq!(response.results.len(), 1);
    let outcome = response.results.get(&2).expect("outcome for label 2");
    assert_eq!(outcome.results()[0].title.as_deref(), Some("Game"));

    let serialized = serde_json::to_value(&response)?;
    assert_eq!(serialized["results"]["2"]["results"][0]["title"], "Game");
    Ok(())
}

#[tokio::test]
async fn test_search_by_missing_label() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let manager = create_test_manager(&server).await?;

    let err = manager.search_by_label(99, "anything").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_search_against_catalog_file() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search/"))
        .and(body_partial_json(json!({
            "url": "https://shop.example.com/s?query=lamp",
            "options": {"nodriver": {"page_wait_time": 2.5}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_body(&["Lamp"])))
        .expect(1)
        .mount(&server)
        .await;

    let file = write_catalog_file(&json!({
        "labels": [{
            "id": 7,
            "label_name": "shop",
            "base_url": "https://shop.example.com/s",
            "query": "query",
            "download_type": "nodriver",
            "download_config": {"nodriver": {"page_wait_time": 2.5}}
        }]
    }))?;
    let catalog = StaticCatalog::load(file.path()).await?;
    assert_eq!(catalog.labels().await?.len(), 1);

    let fetcher = create_test_fetcher(&server)?;
    let response = search_by_label(&catalog, &fetcher, 7, "lamp").await?;

    assert_eq!(response.results.get(&7).map(|o| o.is_error()), Some(false));
    Ok(())
}

#[tokio::test]
async fn test_resolve_and_preview_product_page() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_body(&["Detail"])))
        .expect(1)
        .mount(&server)
        .await;

    let manager = create_test_manager(&server).await?;
    let page = manager
        .resolve_url("https://books.example.com/p/42")
        .await?
        .expect("regex config should match");
    assert_eq!(page.id, Some(11));

    let urls = vec!["https://books.example.com/p/42".to_string()];
    let response = manager.preview_product_page(11, &urls).await?;
    assert_eq!(response.error_count(), 0);
    Ok(())
}

use super::*;
use ex_search::{FetchError, Fetcher};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_fetch_posts_url_sitename_and_options() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search/"))
        .and(body_partial_json(json!({
            "url": "https://books.example.com/p/1",
            "sitename": "gemini",
            "options": {"exclude_script": true, "recreate_parser": false}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_body(&["Rust in Action"])))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = create_test_fetcher(&server)?;
    let payload = fetcher
        .fetch("https://books.example.com/p/1", &DownloadConfig::default())
        .await?;

    assert_eq!(payload["results"][0]["title"], "Rust in Action");
    Ok(())
}

#[tokio::test]
async fn test_fetch_error_status_with_detail() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search/"))
        .respond_with(ResponseTemplate::new(504).set_body_json(json!({"detail": "timeout"})))
        .mount(&server)
        .await;

    let fetcher = create_test_fetcher(&server)?;
    let result = fetcher
        .fetch("https://books.example.com/p/1", &DownloadConfig::default())
        .await;

    assert_eq!(result, Err(FetchError::Message("timeout".to_string())));
    Ok(())
}

#[tokio::test]
async fn test_fetch_error_status_with_structured_body() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"code": 7})))
        .mount(&server)
        .await;

    let fetcher = create_test_fetcher(&server)?;
    let result = fetcher
        .fetch("https://books.example.com/p/1", &DownloadConfig::default())
        .await;

    assert_eq!(result, Err(FetchError::Malformed(json!({"code": 7}))));
    Ok(())
}

#[tokio::test]
async fn test_fetch_unreachable_api_is_message() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_api_config(&server);
    drop(server);

    let fetcher = ApiFetcher::new(config)?;
    let result = fetcher
        .fetch("https://books.example.com/p/1", &DownloadConfig::default())
        .await;

    match result {
        Err(FetchError::Message(message)) => {
            assert!(message.starts_with("Fetch API request failed"));
        }
        other => panic!("expected a message failure, got {:?}", other),
    }
    Ok(())
}

//! AssetsClient against a local HTTP server

#[macro_use]
mod common;

use coincap::domain::PAGE_SIZE;
use coincap::infrastructure::client::assets::{AssetsApiError, AssetsClient};
use common::{assets_body, MockHttpServer};
use std::time::Duration;

fn client(server: &MockHttpServer, api_key: Option<&str>) -> AssetsClient {
    AssetsClient::new(
        server.base_url(),
        api_key.map(str::to_string),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_page_requests_page_times_page_size() {
    let server = MockHttpServer::start(|_| (200, assets_body(PAGE_SIZE, 1))).await;
    let client = client(&server, None);

    for page in 1..=4 {
        let result = client.fetch_page(PAGE_SIZE, page).await.unwrap();
        assert_eq!(result.page, page);
        assert_eq!(result.len(), PAGE_SIZE);
    }

    let requests = server.requests();
    assert_eq!(requests.len(), 4);
    for (i, request) in requests.iter().enumerate() {
        let page = i + 1;
        verbose_println!("page {} -> {} {}", page, request.method, request.path);
        assert_eq!(request.method, "GET");
        assert_eq!(
            request.path,
            format!("/v2/assets?limit={}&offset={}", PAGE_SIZE, page * PAGE_SIZE)
        );
    }
}

#[tokio::test]
async fn test_parses_asset_fields() {
    let server = MockHttpServer::start(|_| (200, assets_body(3, 26))).await;
    let page = client(&server, None).fetch_page(PAGE_SIZE, 1).await.unwrap();

    assert_eq!(page.assets.len(), 3);
    let first = &page.assets[0];
    assert_eq!(first.name, "Coin 26");
    assert_eq!(first.symbol, "C26");
    assert_eq!(first.display_price(), "26.13");
}

#[tokio::test]
async fn test_short_page_is_returned_as_is() {
    let server = MockHttpServer::start(|_| (200, assets_body(10, 1))).await;
    let page = client(&server, None).fetch_page(PAGE_SIZE, 1).await.unwrap();
    assert_eq!(page.len(), 10);
}

#[tokio::test]
async fn test_rate_limit() {
    let server = MockHttpServer::start(|_| (429, r#"{"error":"slow down"}"#.to_string())).await;
    let result = client(&server, None).fetch_page(PAGE_SIZE, 1).await;
    assert!(matches!(result, Err(AssetsApiError::RateLimitExceeded)));
}

#[tokio::test]
async fn test_server_error_keeps_status_and_body() {
    let server = MockHttpServer::start(|_| (500, "boom".to_string())).await;
    let result = client(&server, None).fetch_page(PAGE_SIZE, 1).await;

    match result {
        Err(AssetsApiError::ApiError { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected ApiError, got {:?}", other.map(|p| p.len())),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockHttpServer::start(|_| (200, r#"{"data": "nope"}"#.to_string())).await;
    let result = client(&server, None).fetch_page(PAGE_SIZE, 1).await;
    assert!(matches!(result, Err(AssetsApiError::DeserializeFailed(_))));
}

#[tokio::test]
async fn test_api_key_sent_as_bearer_token() {
    let server = MockHttpServer::start(|_| (200, assets_body(1, 1))).await;

    client(&server, Some("secret-key"))
        .fetch_page(PAGE_SIZE, 1)
        .await
        .unwrap();
    client(&server, None).fetch_page(PAGE_SIZE, 1).await.unwrap();

    let requests = server.requests();
    assert!(requests[0].headers.contains("authorization: bearer secret-key"));
    assert!(!requests[1].headers.contains("authorization"));
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = AssetsClient::new(format!("http://{}", addr), None, Duration::from_secs(2)).unwrap();
    let result = client.fetch_page(PAGE_SIZE, 1).await;
    assert!(matches!(result, Err(AssetsApiError::RequestFailed(_))));
}

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ns_core::{Article, Error, PageFetchResult, REMOVED_TITLE};
use ns_sources::providers::dummy::{sample_articles, DummyProvider};
use ns_sources::{create_provider, ProviderConfig};
use ns_web::{create_app, AppState};
use serde_json::Value;
use tower::ServiceExt;

fn page(articles: Vec<Article>, token: Option<&str>) -> PageFetchResult {
    PageFetchResult {
        articles,
        continuation_token: token.map(str::to_string),
    }
}

fn app(provider: &Arc<DummyProvider>) -> Router {
    create_app(AppState::new(provider.clone()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_headlines_stitches_three_pages() {
    let provider = Arc::new(DummyProvider::with_pages(vec![
        page(sample_articles("One", 10), Some("p2")),
        page(sample_articles("Two", 10), Some("p3")),
        page(sample_articles("Three", 10), None),
    ]));

    let (status, body) = get(app(&provider), "/api/headlines?country=US&category=business&page=1&pageSize=30").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["articles"].as_array().unwrap().len(), 30);
    assert_eq!(body["totalResultsApprox"], 30);
    assert_eq!(body["nextContinuationToken"], Value::Null);

    let calls = provider.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].endpoint, "/latest");
    assert_eq!(calls[0].filters.get("country"), Some("us"));
    assert_eq!(calls[0].filters.get("category"), Some("business"));
    assert_eq!(calls[0].filters.get("language"), Some("en"));
}

#[tokio::test]
async fn test_offline_provider_serves_every_request() {
    let provider = create_provider("dummy", ProviderConfig::default()).unwrap();
    let app = create_app(AppState::new(provider));

    for _ in 0..3 {
        let (status, body) = get(app.clone(), "/api/headlines?pageSize=20").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["articles"].as_array().unwrap().len(), 20);
        assert_eq!(body["nextContinuationToken"], Value::Null);
    }

    let (_, body) = get(app.clone(), "/api/headlines?pageSize=10").await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 10);
    assert_eq!(body["nextContinuationToken"], "evening");

    let (_, body) = get(app.clone(), "/api/headlines?page=evening&pageSize=10").await;
    assert_eq!(body["articles"][0]["title"], "Evening Brief 0");

    let (status, body) = get(app, "/api/trending").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["articles"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_headlines_defaults_and_clamps() {
    let provider = Arc::new(DummyProvider::endless(10));

    let (status, body) = get(app(&provider), "/api/headlines?pageSize=500").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["articles"].as_array().unwrap().len(), 50);
    assert_eq!(body["nextContinuationToken"], "token-5");
    assert_eq!(provider.call_count(), 5);
    assert_eq!(provider.calls()[0].filters.get("country"), Some("us"));
    assert_eq!(provider.calls()[0].filters.get("category"), None);
}

#[tokio::test]
async fn test_headlines_passes_continuation_token() {
    let provider = Arc::new(DummyProvider::with_pages(vec![page(sample_articles("Later", 5), None)]));

    let (status, _) = get(app(&provider), "/api/headlines?page=1714550400123").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.calls()[0].page.as_deref(), Some("1714550400123"));
}

#[tokio::test]
async fn test_blank_search_is_rejected_before_upstream() {
    let provider = Arc::new(DummyProvider::endless(10));

    let (status, body) = get(app(&provider), "/api/search?q=%20%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Search query \"q\" is required");

    let (status, _) = get(app(&provider), "/api/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_search_trims_term_and_honours_language() {
    let provider = Arc::new(DummyProvider::with_pages(vec![page(sample_articles("Rust", 4), None)]));

    let (status, body) = get(app(&provider), "/api/search?q=%20rust%20lang%20&language=fr").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["articles"].as_array().unwrap().len(), 4);
    let calls = provider.calls();
    assert_eq!(calls[0].filters.get("q"), Some("rust lang"));
    assert_eq!(calls[0].filters.get("language"), Some("fr"));
}

#[tokio::test]
async fn test_missing_key_maps_to_service_unavailable() {
    let provider = Arc::new(DummyProvider::failing(Error::Config(
        "NEWSDATA_API_KEY is not configured. Add it to your .env file.".to_string(),
    )));

    let (status, body) = get(app(&provider), "/api/headlines").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "NEWSDATA_API_KEY is not configured. Add it to your .env file.");
    assert!(body.get("articles").is_none());
}

#[tokio::test]
async fn test_upstream_errors_map_to_bad_gateway() {
    let provider = Arc::new(DummyProvider::with_responses(vec![
        Ok(page(sample_articles("One", 10), Some("p2"))),
        Err(Error::UpstreamApi {
            code: Some("UnsupportedQueryLength".to_string()),
            message: "Query length cannot be greater than 100".to_string(),
        }),
    ]));

    let (status, body) = get(app(&provider), "/api/search?q=news&pageSize=20").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Query length cannot be greater than 100");

    let provider = Arc::new(DummyProvider::failing(Error::UpstreamFormat("not json".to_string())));
    let (status, _) = get(app(&provider), "/api/trending").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_trending_is_small_unique_and_clean() {
    let mut articles = sample_articles("Hot", 14);
    articles.push(Article {
        url: "https://dummy.test/removed".to_string(),
        title: REMOVED_TITLE.to_string(),
        ..Default::default()
    });
    articles.push(Article {
        url: "https://dummy.test/hot/2".to_string(),
        title: "Hot 2 (updated)".to_string(),
        ..Default::default()
    });
    let provider = Arc::new(DummyProvider::with_pages(vec![page(articles, Some("more"))]));

    let (status, body) = get(app(&provider), "/api/trending").await;

    assert_eq!(status, StatusCode::OK);
    let returned = body["articles"].as_array().unwrap();
    assert_eq!(returned.len(), 10);
    assert_eq!(body["totalResultsApprox"], 14);
    let urls: HashSet<_> = returned.iter().map(|a| a["url"].as_str().unwrap()).collect();
    assert_eq!(urls.len(), returned.len());
    assert!(returned.iter().all(|a| a["title"] != REMOVED_TITLE));

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].page, None);
    assert_eq!(calls[0].filters.get("country"), Some("us,gb,in,ca,au"));
    let category = calls[0].filters.get("category").unwrap();
    assert!(ns_web::handlers::TRENDING_CATEGORIES.contains(&category));
}

#[tokio::test]
async fn test_trending_page_size_only_shrinks() {
    let provider = Arc::new(DummyProvider::with_pages(vec![page(sample_articles("Hot", 14), None)]));
    let (_, body) = get(app(&provider), "/api/trending?pageSize=3").await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 3);

    let provider = Arc::new(DummyProvider::with_pages(vec![page(sample_articles("Hot", 14), None)]));
    let (_, body) = get(app(&provider), "/api/trending?pageSize=15").await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_security_and_cors_headers() {
    let provider = Arc::new(DummyProvider::endless(10));
    let response = app(&provider)
        .oneshot(
            Request::builder()
                .uri("/api/headlines?pageSize=5")
                .header("origin", "https://elsewhere.test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_unknown_path_without_public_dir() {
    let provider = Arc::new(DummyProvider::endless(10));
    let (status, body) = get(app(&provider), "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_static_files_and_not_found_page() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>NewsSphere</h1>").unwrap();
    std::fs::write(dir.path().join("404.html"), "<h1>Lost</h1>").unwrap();
    let provider = Arc::new(DummyProvider::endless(10));
    let app = create_app(AppState::new(provider).with_public_dir(dir.path()));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>NewsSphere</h1>");

    let response = app
        .oneshot(Request::builder().uri("/missing.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>Lost</h1>");
}

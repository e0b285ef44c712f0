//! Fetch engine behaviour against a mock server

use crate::{fast_config, fast_fetcher, html};
use harrow::config::parse_config;
use harrow::fetch::{build_http_client, AgentList, FetchRequest, IdentityRotator, ProxyPool};
use harrow::{FetchError, Fetcher};
use std::sync::Arc;
use wiremock::matchers::{
    body_json, body_string, header, header_exists, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_successful_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html("<html><body>hello</body></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/page", mock_server.uri());
    let page = fast_fetcher(3).get(&url).await.expect("Fetch failed");

    assert_eq!(page.url, url);
    assert_eq!(page.status, 200);
    assert_eq!(page.content_type, "text/html");
    assert!(page.body.contains("hello"));
}

#[tokio::test]
async fn test_failing_endpoint_receives_max_retries_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let url = format!("{}/broken", mock_server.uri());
    let result = fast_fetcher(3).get(&url).await;

    match result {
        Err(FetchError::Exhausted {
            attempts,
            last_error,
            ..
        }) => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("500"));
        }
        other => panic!("Expected exhausted retries, got {:?}", other),
    }
}

#[tokio::test]
async fn test_not_found_is_retried_like_any_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&mock_server)
        .await;

    let url = format!("{}/missing", mock_server.uri());
    assert!(fast_fetcher(2).get(&url).await.is_err());
}

#[tokio::test]
async fn test_recovers_after_transient_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html("recovered"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/flaky", mock_server.uri());
    let page = fast_fetcher(3).get(&url).await.expect("Fetch should recover");
    assert_eq!(page.body, "recovered");
}

#[tokio::test]
async fn test_per_request_retry_override() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = FetchRequest::get(mock_server.uri()).with_max_retries(1);
    let result = fast_fetcher(5).fetch(&request).await;
    assert!(matches!(result, Err(FetchError::Exhausted { attempts: 1, .. })));
}

#[tokio::test]
async fn test_browser_identity_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept"))
        .and(header("accept-language", "en-US,en;q=0.5"))
        .and(header("dnt", "1"))
        .and(header("upgrade-insecure-requests", "1"))
        .respond_with(html("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = fast_fetcher(1).get(&mock_server.uri()).await;
    assert!(page.is_ok());
}

#[tokio::test]
async fn test_enhanced_identity_source_is_used() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "HarrowTest/1.0"))
        .respond_with(html("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let agents = AgentList::parse("HarrowTest/1.0\n").expect("Agent list should parse");
    let rotator = IdentityRotator::with_source(Box::new(agents));
    assert!(rotator.is_enhanced());

    let fetcher =
        Fetcher::with_parts(fast_config(1), rotator, Arc::new(ProxyPool::default())).unwrap();
    assert!(fetcher.get(&mock_server.uri()).await.is_ok());
}

#[tokio::test]
async fn test_post_with_body_and_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .and(body_string("q=rust"))
        .respond_with(html("results"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = FetchRequest::post(format!("{}/search", mock_server.uri()), "q=rust")
        .with_query("page", "2");
    let page = fast_fetcher(1).fetch(&request).await.expect("POST failed");
    assert_eq!(page.body, "results");
}

#[tokio::test]
async fn test_post_with_json_body() {
    let mock_server = MockServer::start().await;
    let payload = serde_json::json!({"query": "rust", "filters": ["books"], "page": 2});

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(header("content-type", "application/json"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"hits\":3}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/api/search", mock_server.uri());
    let request = FetchRequest::new(reqwest::Method::POST, url).with_json(payload.clone());
    let page = fast_fetcher(1).fetch(&request).await.expect("JSON POST failed");
    assert_eq!(page.body, "{\"hits\":3}");
}

#[tokio::test]
async fn test_failed_proxy_is_evicted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("direct"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Nothing listens on port 1, so the first attempt fails through the proxy
    let pool = Arc::new(ProxyPool::from_entries(["127.0.0.1:1"]));
    let config = harrow::FetchConfig {
        use_proxies: true,
        ..fast_config(2)
    };
    let fetcher =
        Fetcher::with_parts(config, IdentityRotator::fallback(), Arc::clone(&pool)).unwrap();

    let page = fetcher.get(&mock_server.uri()).await.expect("Direct retry failed");
    assert_eq!(page.body, "direct");
    assert!(pool.is_empty());
}

#[tokio::test]
async fn test_proxy_pool_load() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/list-a.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("1.1.1.1:80\n2.2.2.2:8080\n\nnot-a-proxy\n"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/list-b.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("2.2.2.2:8080\n3.3.3.3:3128\n"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/down.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let sources = vec![
        format!("{}/list-a.txt", mock_server.uri()),
        format!("{}/down.txt", mock_server.uri()),
        format!("{}/list-b.txt", mock_server.uri()),
    ];

    let client = build_http_client(&fast_config(1), None).unwrap();
    let pool = ProxyPool::default();
    let total = pool.load(&client, &sources).await;

    assert_eq!(total, 3);
    let mut entries = pool.entries();
    entries.sort();
    assert_eq!(entries, vec!["1.1.1.1:80", "2.2.2.2:8080", "3.3.3.3:3128"]);
}

#[tokio::test]
async fn test_fetcher_from_config_file_settings() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/proxies.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("10.0.0.1:80\n10.0.0.2:80\n"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = parse_config(&format!(
        r#"
[fetcher]
delay = 0.001
max-retries = 2
backoff-min = 0.0
backoff-max = 0.0

[proxies]
sources = ["{}/proxies.txt"]
per-source-limit = 1
"#,
        mock_server.uri()
    ))
    .expect("Config should parse");

    let fetcher = Fetcher::from_config(&config).unwrap();
    assert_eq!(fetcher.load_proxies(&config.proxies.sources).await, 1);

    // Proxies are loaded but not enabled, so requests go direct
    let result = fetcher.get(&format!("{}/", mock_server.uri())).await;
    assert!(matches!(result, Err(FetchError::Exhausted { attempts: 2, .. })));
    assert_eq!(fetcher.proxy_pool().len(), 1);
}

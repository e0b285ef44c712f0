//! Extractor fetch-then-parse semantics

use crate::{fast_fetcher, html};
use harrow::{Extractor, FieldValue, SelectorSpec};
use std::collections::HashSet;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRODUCT_PAGE: &str = r#"<html><body>
    <h1>Hello</h1>
    <ul>
        <li class="tag">a</li>
        <li class="tag">b</li>
        <li class="tag">c</li>
    </ul>
    <a href="/b">B</a>
    <a href="/c">C</a>
    <a href="https://other.invalid/d">D</a>
    <table>
        <tr><th>k</th><th>v</th></tr>
        <tr><td>x</td><td>1</td></tr>
    </table>
</body></html>"#;

async fn product_server() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(PRODUCT_PAGE))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(html("<html><body><p>no tables</p></body></html>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    mock_server
}

#[tokio::test]
async fn test_extract_fields() {
    let mock_server = product_server().await;
    let extractor = Extractor::new(fast_fetcher(1));

    let spec = SelectorSpec::new()
        .with_field("title", "h1")
        .and_then(|s| s.with_field("tags", ".tag"))
        .and_then(|s| s.with_field("price", ".price"))
        .unwrap();

    let url = format!("{}/a", mock_server.uri());
    let result = extractor
        .extract_fields(&url, &spec)
        .await
        .expect("Page should be fetched");

    assert_eq!(result.url(), url);
    assert_eq!(result.get("title"), Some(&FieldValue::Single("Hello".to_string())));
    assert_eq!(
        result.get("tags"),
        Some(&FieldValue::Multiple(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string()
        ]))
    );
    assert_eq!(result.get("price"), Some(&FieldValue::Null));
}

#[tokio::test]
async fn test_extract_fields_fetch_failure() {
    let mock_server = product_server().await;
    let extractor = Extractor::new(fast_fetcher(1));
    let spec = SelectorSpec::new().with_field("title", "h1").unwrap();

    let url = format!("{}/gone", mock_server.uri());
    assert!(extractor.extract_fields(&url, &spec).await.is_none());
}

#[tokio::test]
async fn test_extract_links() {
    let mock_server = product_server().await;
    let extractor = Extractor::new(fast_fetcher(1));

    let url = format!("{}/a", mock_server.uri());
    let links = extractor
        .extract_links(&url, None, &HashSet::new())
        .await
        .expect("Page should be fetched");

    assert_eq!(
        links,
        vec![
            format!("{}/b", mock_server.uri()),
            format!("{}/c", mock_server.uri())
        ]
    );
}

#[tokio::test]
async fn test_extract_tables() {
    let mock_server = product_server().await;
    let extractor = Extractor::new(fast_fetcher(1));

    let url = format!("{}/a", mock_server.uri());
    let tables = extractor
        .extract_tables(&url, None)
        .await
        .expect("Page should be fetched");

    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].rows()[1], vec!["x".to_string(), "1".to_string()]);
}

#[tokio::test]
async fn test_no_tables_is_empty_not_none() {
    let mock_server = product_server().await;
    let extractor = Extractor::new(fast_fetcher(1));

    let url = format!("{}/plain", mock_server.uri());
    assert_eq!(extractor.extract_tables(&url, Some("table")).await, Some(vec![]));
}

#[tokio::test]
async fn test_tables_fetch_failure_is_none() {
    let mock_server = product_server().await;
    let extractor = Extractor::new(fast_fetcher(1));

    let url = format!("{}/gone", mock_server.uri());
    assert_eq!(extractor.extract_tables(&url, None).await, None);
}

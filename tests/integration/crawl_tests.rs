//! Integration tests for the breadth-first crawler

use crate::{fast_fetcher, html};
use harrow::{Coordinator, CrawlOptions, Extractor, SelectorSpec};
use std::collections::HashSet;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn coordinator(max_retries: u32) -> Coordinator {
    Coordinator::new(Extractor::new(fast_fetcher(max_retries)))
}

fn title_spec() -> SelectorSpec {
    SelectorSpec::new().with_field("title", "h1").unwrap()
}

fn options(max_pages: usize, max_depth: u32) -> CrawlOptions {
    CrawlOptions {
        max_pages,
        max_depth,
        link_selector: None,
    }
}

/// Mounts a page with a heading and links to the given paths
async fn mount_page(server: &MockServer, page: &str, title: &str, links: &[&str]) {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">{}</a>"#, link, link))
        .collect();

    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(format!(
            "<html><body><h1>{}</h1>{}</body></html>",
            title, anchors
        )))
        .expect(1)
        .mount(server)
        .await;
}

fn titles(results: &[harrow::ExtractionResult]) -> Vec<String> {
    results
        .iter()
        .map(|r| {
            r.get("title")
                .and_then(|v| v.as_single())
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

#[tokio::test]
async fn test_breadth_first_order() {
    let mock_server = MockServer::start().await;

    // A -> B, C; B -> D; C -> E
    mount_page(&mock_server, "/", "A", &["/b", "/c"]).await;
    mount_page(&mock_server, "/b", "B", &["/d"]).await;
    mount_page(&mock_server, "/c", "C", &["/e"]).await;
    mount_page(&mock_server, "/d", "D", &[]).await;
    mount_page(&mock_server, "/e", "E", &[]).await;

    let start = format!("{}/", mock_server.uri());
    let results = coordinator(1)
        .crawl(&start, &title_spec(), &options(10, 2))
        .await
        .expect("Crawl failed");

    assert_eq!(titles(&results), vec!["A", "B", "C", "D", "E"]);
    assert_eq!(results[0].url(), start);
    assert_eq!(results[3].url(), format!("{}/d", mock_server.uri()));
}

#[tokio::test]
async fn test_cycles_are_fetched_once() {
    let mock_server = MockServer::start().await;

    // Every page links to every other page and itself
    let all = ["/", "/one", "/two"];
    mount_page(&mock_server, "/", "root", &all).await;
    mount_page(&mock_server, "/one", "one", &all).await;
    mount_page(&mock_server, "/two", "two", &all).await;

    let start = format!("{}/", mock_server.uri());
    let results = coordinator(1)
        .crawl(&start, &title_spec(), &options(10, 5))
        .await
        .expect("Crawl failed");

    assert_eq!(results.len(), 3);
    let unique: HashSet<&str> = results.iter().map(|r| r.url()).collect();
    assert_eq!(unique.len(), 3);
}

#[tokio::test]
async fn test_max_pages_bound() {
    let mock_server = MockServer::start().await;

    let children: Vec<String> = (0..20).map(|i| format!("/p{}", i)).collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            "<html><body><h1>root</h1>{}</body></html>",
            child_refs
                .iter()
                .map(|c| format!(r#"<a href="{}">x</a>"#, c))
                .collect::<String>()
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html("<html><body><h1>child</h1></body></html>"))
        .mount(&mock_server)
        .await;

    let start = format!("{}/", mock_server.uri());
    let results = coordinator(1)
        .crawl(&start, &title_spec(), &options(4, 3))
        .await
        .expect("Crawl failed");

    assert_eq!(results.len(), 4);
    let urls: Vec<&str> = results.iter().map(|r| r.url()).collect();
    let unique: HashSet<&str> = urls.iter().copied().collect();
    assert_eq!(unique.len(), urls.len());

    // Children are visited in document order
    assert_eq!(urls[1], format!("{}/p0", mock_server.uri()));
    assert_eq!(urls[3], format!("{}/p2", mock_server.uri()));
}

#[tokio::test]
async fn test_depth_zero_only_visits_start() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", "start", &["/next"]).await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html("<h1>next</h1>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let start = format!("{}/", mock_server.uri());
    let results = coordinator(1)
        .crawl(&start, &title_spec(), &options(10, 0))
        .await
        .expect("Crawl failed");

    assert_eq!(titles(&results), vec!["start"]);
}

#[tokio::test]
async fn test_failed_pages_count_but_yield_no_result() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", "start", &["/gone", "/ok"]).await;
    mount_page(&mock_server, "/ok", "ok", &[]).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let start = format!("{}/", mock_server.uri());
    let results = coordinator(1)
        .crawl(&start, &title_spec(), &options(10, 1))
        .await
        .expect("Crawl failed");

    assert_eq!(titles(&results), vec!["start", "ok"]);
}

#[tokio::test]
async fn test_external_links_not_followed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<h1>start</h1>
               <a href="https://elsewhere.invalid/page">away</a>
               <a href="/local">local</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/local", "local", &[]).await;

    let start = format!("{}/", mock_server.uri());
    let results = coordinator(1)
        .crawl(&start, &title_spec(), &options(10, 2))
        .await
        .expect("Crawl failed");

    assert_eq!(titles(&results), vec!["start", "local"]);
}

#[tokio::test]
async fn test_link_selector_restricts_followed_links() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<h1>page 1</h1>
               <a href="/about">about</a>
               <a class="next" href="/page2">next</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/page2", "page 2", &[]).await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<h1>about</h1>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let start = format!("{}/", mock_server.uri());
    let crawl_options = CrawlOptions {
        link_selector: Some("a.next".to_string()),
        ..options(10, 3)
    };
    let results = coordinator(1)
        .crawl(&start, &title_spec(), &crawl_options)
        .await
        .expect("Crawl failed");

    assert_eq!(titles(&results), vec!["page 1", "page 2"]);
}

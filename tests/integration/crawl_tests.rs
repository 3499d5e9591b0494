//! Integration tests for link discovery
//!
//! These tests use wiremock to serve small sites and run the bounded
//! breadth-first crawl end-to-end.

use seo_auditor::config::UserAgentConfig;
use seo_auditor::crawler::{build_http_client, discover};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client() -> reqwest::Client {
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
    };
    build_http_client(&user_agent, Duration::from_secs(5)).expect("client")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>t</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn paths(urls: &[Url]) -> HashSet<String> {
    urls.iter().map(|u| u.path().to_string()).collect()
}

#[tokio::test]
async fn test_repeated_links_are_visited_once() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/about">About</a> <a href="/about">About again</a>"#,
    )
    .await;
    mount_page(&server, "/about", r#"<a href="/">Home</a>"#).await;

    let start = Url::parse(&server.uri()).unwrap();
    let pages = discover(&test_client(), &start, 10).await;

    assert_eq!(pages.len(), 2);
    assert_eq!(
        paths(&pages),
        HashSet::from(["/".to_string(), "/about".to_string()])
    );
}

#[tokio::test]
async fn test_page_limit_stops_a_cycle() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/b">B</a>"#).await;
    mount_page(&server, "/b", r#"<a href="/">Home</a> <a href="/c">C</a>"#).await;
    mount_page(&server, "/c", r#"<a href="/a">A</a>"#).await;

    let start = Url::parse(&server.uri()).unwrap();
    let pages = discover(&test_client(), &start, 2).await;

    assert_eq!(
        paths(&pages),
        HashSet::from(["/".to_string(), "/a".to_string()])
    );
}

#[tokio::test]
async fn test_zero_limit_still_visits_start_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(&server, "/a", "").await;

    let start = Url::parse(&server.uri()).unwrap();
    let pages = discover(&test_client(), &start, 0).await;

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].path(), "/");
}

#[tokio::test]
async fn test_foreign_origin_is_never_fetched() {
    let site = MockServer::start().await;
    let foreign = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("elsewhere"))
        .expect(0)
        .mount(&foreign)
        .await;

    mount_page(
        &site,
        "/",
        &format!(
            r#"<a href="{}/outside">Outside</a> <a href="/inside">Inside</a>"#,
            foreign.uri()
        ),
    )
    .await;
    mount_page(&site, "/inside", "").await;

    let start = Url::parse(&site.uri()).unwrap();
    let pages = discover(&test_client(), &start, 10).await;

    assert_eq!(
        paths(&pages),
        HashSet::from(["/".to_string(), "/inside".to_string()])
    );
    for page in &pages {
        assert_eq!(page.port(), start.port());
    }
}

#[tokio::test]
async fn test_non_html_and_unreachable_pages_are_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/report.pdf">PDF</a> <a href="http://127.0.0.1:9/down">Down</a> <a href="/ok">OK</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&server)
        .await;
    mount_page(&server, "/ok", "").await;

    let start = Url::parse(&server.uri()).unwrap();
    let pages = discover(&test_client(), &start, 10).await;

    assert_eq!(
        paths(&pages),
        HashSet::from(["/".to_string(), "/ok".to_string()])
    );
}

#[tokio::test]
async fn test_relative_links_are_followed() {
    let server = MockServer::start().await;
    mount_page(&server, "/docs/", r#"<a href="intro">Intro</a>"#).await;
    mount_page(&server, "/docs/intro", r#"<a href="../">Up</a>"#).await;
    mount_page(&server, "/", "").await;

    let start = Url::parse(&format!("{}/docs/", server.uri())).unwrap();
    let pages = discover(&test_client(), &start, 10).await;

    assert_eq!(
        paths(&pages),
        HashSet::from([
            "/docs/".to_string(),
            "/docs/intro".to_string(),
            "/".to_string()
        ])
    );
}

#[tokio::test]
async fn test_redirected_page_resolves_links_against_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/blog/"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/blog/",
        r#"<a href="post-1">Post</a> <a href="/blog/">Blog</a> <a href="/blog">Blog again</a>"#,
    )
    .await;
    mount_page(&server, "/blog/post-1", "").await;

    let start = Url::parse(&format!("{}/blog", server.uri())).unwrap();
    let pages = discover(&test_client(), &start, 10).await;

    assert_eq!(
        paths(&pages),
        HashSet::from(["/blog/".to_string(), "/blog/post-1".to_string()])
    );

    let requested: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert!(!requested.contains(&"/post-1".to_string()));
    assert_eq!(requested.iter().filter(|p| *p == "/blog/").count(), 1);
}

#[tokio::test]
async fn test_redirect_to_visited_page_is_not_counted_twice() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/home">Home</a> <a href="/next">Next</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/"))
        .mount(&server)
        .await;
    mount_page(&server, "/next", "").await;

    let start = Url::parse(&server.uri()).unwrap();
    let pages = discover(&test_client(), &start, 2).await;

    assert_eq!(
        paths(&pages),
        HashSet::from(["/".to_string(), "/next".to_string()])
    );
}

#[tokio::test]
async fn test_unreachable_start_yields_nothing() {
    let start = Url::parse("http://127.0.0.1:9/").unwrap();
    let pages = discover(&test_client(), &start, 5).await;
    assert!(pages.is_empty());
}

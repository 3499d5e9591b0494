//! Crawler module for web page fetching and link discovery
//!
//! This module contains:
//! - HTTP fetching with content-type classification
//! - HTML parsing and link extraction
//! - Whole-page SEO checks
//! - Bounded breadth-first link discovery

mod discover;
mod facts;
mod fetcher;
mod parser;

pub use discover::LinkDiscoverer;
pub use facts::{extract_page_facts, PageFacts};
pub use fetcher::{build_http_client, fetch_url, is_html_content_type, FetchResult};
pub use parser::{parse_html, ParsedPage};

use reqwest::Client;
use url::Url;

/// Runs one bounded crawl from `start_url`
///
/// Convenience wrapper around [`LinkDiscoverer::discover`].
///
/// # Arguments
///
/// * `client` - The HTTP client used for page fetches
/// * `start_url` - The page the crawl starts from; also defines the origin
/// * `page_limit` - Maximum number of pages visited
pub async fn discover(client: &Client, start_url: &Url, page_limit: usize) -> Vec<Url> {
    LinkDiscoverer::new(client.clone(), page_limit)
        .discover(start_url)
        .await
}

//! Link discovery - bounded breadth-first crawl of a single site
//!
//! Starting from one page, the discoverer follows same-origin links in
//! breadth-first order until the frontier is empty or the page limit is
//! reached. Pages that fail to load or are not HTML are dropped without
//! counting towards the limit.

use crate::crawler::parser::parse_html;
use crate::crawler::{fetch_url, FetchResult};
use crate::state::CrawlState;
use crate::url::is_same_origin;
use reqwest::Client;
use url::Url;

/// Crawls a site to collect candidate pages for an audit
#[derive(Debug, Clone)]
pub struct LinkDiscoverer {
    client: Client,
    page_limit: usize,
}

impl LinkDiscoverer {
    /// Creates a discoverer that visits at most `page_limit` pages per run
    pub fn new(client: Client, page_limit: usize) -> Self {
        Self { client, page_limit }
    }

    /// Runs one bounded crawl from `start_url`
    ///
    /// Returns the pages that were fetched successfully as HTML, in the order
    /// they were visited. A redirected page is reported under its final
    /// address. Callers should only rely on membership.
    pub async fn discover(&self, start_url: &Url) -> Vec<Url> {
        let mut state = CrawlState::new(start_url.clone(), self.page_limit);
        let mut discovered = Vec::new();

        tracing::info!(
            start_url = %start_url,
            page_limit = state.page_limit(),
            "Starting link discovery"
        );

        while let Some(url) = state.next_url() {
            tracing::debug!(url = %url, "Fetching page for link discovery");

            let (body, page_url) = match fetch_url(&self.client, &url).await {
                FetchResult::Success {
                    body,
                    status_code,
                    final_url,
                    ..
                } => {
                    if !(200..300).contains(&status_code) {
                        tracing::debug!(url = %url, status_code, "Non-2xx HTML response, crawling anyway");
                    }
                    (body, final_url)
                }
                FetchResult::ContentMismatch { content_type, .. } => {
                    tracing::debug!(url = %url, content_type = %content_type, "Skipping non-HTML page");
                    continue;
                }
                FetchResult::NetworkError { error } => {
                    tracing::warn!(url = %url, error = %error, "Failed to fetch page, dropping it");
                    continue;
                }
            };

            if page_url != url {
                if !is_same_origin(start_url, &page_url) {
                    tracing::debug!(url = %url, final_url = %page_url, "Redirected off-origin, dropping it");
                    continue;
                }
                if state.is_visited(&page_url) {
                    tracing::debug!(url = %url, final_url = %page_url, "Redirect target already visited");
                    state.mark_alias(&url);
                    continue;
                }
            }

            if !state.mark_visited(&url) {
                continue;
            }
            if page_url != url {
                state.mark_alias(&page_url);
            }
            discovered.push(page_url.clone());

            // Relative links resolve against the address the body came from
            let parsed = parse_html(&body, &page_url);
            tracing::debug!(
                url = %page_url,
                title = parsed.title.as_deref().unwrap_or(""),
                links = parsed.links.len(),
                "Parsed page"
            );
            for link in parsed.links {
                if is_same_origin(start_url, &link) {
                    state.enqueue(link);
                }
            }
        }

        tracing::info!(
            start_url = %start_url,
            discovered = discovered.len(),
            remaining_frontier = state.frontier_len(),
            "Link discovery finished"
        );

        discovered
    }
}

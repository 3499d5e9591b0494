//! HTTP fetcher implementation
//!
//! This module handles page requests for the crawler and the auditor:
//! - Building HTTP clients with a proper user agent string and timeouts
//! - GET requests that classify the response by Content-Type
//! - Error classification (network failure vs. non-HTML content)

use crate::config::UserAgentConfig;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for a single fetch
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Received an HTML document
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code (not necessarily 2xx)
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The HTTP status code
        status_code: u16,
        /// The actual Content-Type received
        content_type: String,
    },

    /// Network error (connection refused, timeout, unreadable body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds the HTTP client used to fetch crawl targets
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Overall budget for one page fetch
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use seo_auditor::config::UserAgentConfig;
/// use seo_auditor::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SeoAuditAgent".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the response
///
/// Non-2xx responses are not treated as failures here; callers decide
/// whether the status matters.
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                format!("Request timeout: {}", e)
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status_code = response.status().as_u16();
    let final_url = response.url().clone();

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html_content_type(&content_type) {
        return FetchResult::ContentMismatch {
            status_code,
            content_type,
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code,
            content_type,
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

/// Returns true if a Content-Type header value denotes an HTML document
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

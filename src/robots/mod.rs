//! Robots.txt and sitemap probing
//!
//! Before a page is audited, the well-known resources at its origin are
//! checked. A missing or unreachable resource is reported as absent; probing
//! never fails an audit.

mod parser;

pub use parser::ParsedRobots;

use crate::url::origin_base;
use reqwest::Client;
use std::fmt;
use url::Url;

/// Facts about the site hosting an audited page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFacts {
    /// `/robots.txt` answered with HTTP 200
    pub robots_txt_present: bool,

    /// `/sitemap.xml` answered with HTTP 200
    pub sitemap_present: bool,

    /// Sitemaps declared in robots.txt
    pub declared_sitemaps: Vec<String>,

    /// robots.txt allows the crawler to fetch the audited page
    pub page_allowed: bool,
}

impl fmt::Display for SiteFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present = |flag: bool| if flag { "Present" } else { "Missing" };
        writeln!(f, "robots.txt: {}", present(self.robots_txt_present))?;
        writeln!(f, "sitemap.xml: {}", present(self.sitemap_present))?;
        if !self.declared_sitemaps.is_empty() {
            writeln!(
                f,
                "Sitemaps declared in robots.txt: {}",
                self.declared_sitemaps.join(", ")
            )?;
        }
        write!(
            f,
            "Page allowed by robots.txt: {}",
            if self.page_allowed { "Yes" } else { "No" }
        )
    }
}

/// Fetches robots.txt for the origin of `page_url`
///
/// Returns `None` when the file is missing or cannot be fetched.
pub async fn fetch_robots(client: &Client, page_url: &Url) -> Option<ParsedRobots> {
    let robots_url = format!("{}/robots.txt", origin_base(page_url));

    match client.get(&robots_url).send().await {
        Ok(response) if response.status().as_u16() == 200 => match response.text().await {
            Ok(body) => Some(ParsedRobots::from_content(&body)),
            Err(e) => {
                tracing::warn!(url = %robots_url, error = %e, "Failed to read robots.txt body");
                None
            }
        },
        Ok(response) => {
            tracing::debug!(url = %robots_url, status = %response.status(), "robots.txt not available");
            None
        }
        Err(e) => {
            tracing::warn!(url = %robots_url, error = %e, "Failed to fetch robots.txt");
            None
        }
    }
}

/// Checks robots.txt and sitemap.xml at the origin of `page_url`
///
/// # Arguments
///
/// * `client` - The HTTP client used for crawl fetches
/// * `page_url` - The page being audited
/// * `user_agent` - The crawler's product token, matched against robots.txt groups
pub async fn probe_site(client: &Client, page_url: &Url, user_agent: &str) -> SiteFacts {
    let robots = fetch_robots(client, page_url).await;
    let sitemap_url = format!("{}/sitemap.xml", origin_base(page_url));

    let sitemap_present = match client.get(&sitemap_url).send().await {
        Ok(response) => response.status().as_u16() == 200,
        Err(e) => {
            tracing::warn!(url = %sitemap_url, error = %e, "Failed to fetch sitemap.xml");
            false
        }
    };

    let robots_txt_present = robots.is_some();
    let robots = robots.unwrap_or_else(ParsedRobots::allow_all);

    SiteFacts {
        robots_txt_present,
        sitemap_present,
        declared_sitemaps: robots.sitemaps(),
        page_allowed: robots.is_allowed(page_url.as_str(), user_agent),
    }
}

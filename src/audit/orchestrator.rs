//! Audit orchestration
//!
//! Drives the model through the audit of one page (chunk audits, then a page
//! synthesis) or of a whole site (template deduplication, page audits, then a
//! final synthesis). All fetches and model requests are issued one at a
//! time, so reports always come back in chunk/page order.
//!
//! A model failure is returned as an error straight away; no further model
//! requests are made for that audit.

use crate::audit::{prompts, segment, AuditReport, Chunk, Provenance};
use crate::config::Config;
use crate::crawler::{
    build_http_client, extract_page_facts, fetch_url, FetchResult, LinkDiscoverer, PageFacts,
};
use crate::model::ModelClient;
use crate::robots::{probe_site, SiteFacts};
use crate::url::normalize_url;
use crate::AuditError;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Runs page and site audits against the model endpoint
#[derive(Debug, Clone)]
pub struct Auditor {
    crawl_client: Client,
    model: ModelClient,
    chunk_lines: usize,
    page_limit: usize,
    robots_agent: String,
}

impl Auditor {
    /// Builds an auditor from the loaded configuration
    pub fn new(config: &Config) -> Result<Self, AuditError> {
        let crawl_client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.fetch_timeout_secs),
        )?;
        let model = ModelClient::new(&config.model)?;

        Ok(Self::from_parts(
            crawl_client,
            model,
            config.audit.chunk_lines,
            config.crawler.page_limit,
            config.user_agent.crawler_name.clone(),
        ))
    }

    /// Builds an auditor from already constructed clients
    pub fn from_parts(
        crawl_client: Client,
        model: ModelClient,
        chunk_lines: usize,
        page_limit: usize,
        robots_agent: String,
    ) -> Self {
        Self {
            crawl_client,
            model,
            chunk_lines: chunk_lines.max(1),
            page_limit,
            robots_agent,
        }
    }

    /// Crawls every seed and returns the union of discovered pages
    ///
    /// Pages found from several seeds appear once, in first-seen order.
    pub async fn discover_candidates(&self, seeds: &[Url]) -> Vec<Url> {
        let discoverer = LinkDiscoverer::new(self.crawl_client.clone(), self.page_limit);
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for seed in seeds {
            for url in discoverer.discover(seed).await {
                if seen.insert(link_key(&url)) {
                    candidates.push(url);
                }
            }
        }

        candidates
    }

    /// Audits one page
    ///
    /// Returns `Ok(None)` when the page cannot be fetched as HTML with a 2xx
    /// status, or when it is empty.
    pub async fn audit_page(
        &self,
        url: &Url,
        credential: &str,
    ) -> Result<Option<AuditReport>, AuditError> {
        tracing::info!(url = %url, "Auditing page");

        let body = match fetch_url(&self.crawl_client, url).await {
            FetchResult::Success {
                body,
                status_code,
                final_url,
                ..
            } if (200..300).contains(&status_code) => {
                if final_url != *url {
                    tracing::debug!(url = %url, final_url = %final_url, "Page was redirected");
                }
                body
            }
            FetchResult::Success { status_code, .. } => {
                tracing::warn!(url = %url, status_code, "Page returned an error status");
                return Ok(None);
            }
            FetchResult::ContentMismatch { content_type, .. } => {
                tracing::warn!(url = %url, content_type = %content_type, "Page is not HTML");
                return Ok(None);
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!(url = %url, error = %error, "Page is unreachable");
                return Ok(None);
            }
        };

        let chunks = segment(&body, url.as_str(), self.chunk_lines);
        if chunks.is_empty() {
            tracing::warn!(url = %url, "Page has no content to audit");
            return Ok(None);
        }

        let page_facts = extract_page_facts(&body);
        let site_facts = probe_site(&self.crawl_client, url, &self.robots_agent).await;

        let mut chunk_reports = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let report = self
                .audit_chunk(url, chunk, chunks.len(), &site_facts, &page_facts, credential)
                .await?;
            chunk_reports.push(report);
        }

        let page_report = self
            .synthesize(chunk_reports, Provenance::Page { url: url.clone() }, credential)
            .await?;

        tracing::info!(url = %url, chunks = chunks.len(), "Page audit complete");
        Ok(Some(page_report))
    }

    /// Audits a set of candidate pages and merges the results
    ///
    /// Candidates are first reduced to one page per template. Representatives
    /// that cannot be fetched are skipped; if none produce a report the audit
    /// fails with [`AuditError::NothingAudited`].
    pub async fn audit_site(
        &self,
        seed_links: &[Url],
        credential: &str,
    ) -> Result<AuditReport, AuditError> {
        let representatives = self.dedupe_links(seed_links, credential).await?;

        tracing::info!(
            candidates = seed_links.len(),
            representatives = representatives.len(),
            "Auditing site"
        );

        let mut page_reports = Vec::with_capacity(representatives.len());
        for url in &representatives {
            match self.audit_page(url, credential).await? {
                Some(report) => page_reports.push(report),
                None => tracing::warn!(url = %url, "Skipping page that could not be audited"),
            }
        }

        if page_reports.is_empty() {
            return Err(AuditError::NothingAudited);
        }

        self.synthesize(page_reports, Provenance::Site, credential)
            .await
    }

    /// Asks the model to keep one representative URL per page template
    ///
    /// Lists with fewer than two links are returned as they are. Entries in
    /// the reply that are not among `links` are ignored; an unusable reply
    /// falls back to the full list.
    pub async fn dedupe_links(
        &self,
        links: &[Url],
        credential: &str,
    ) -> Result<Vec<Url>, AuditError> {
        if links.len() < 2 {
            return Ok(links.to_vec());
        }

        let reply = self
            .model
            .request_analysis(&prompts::deduplicate_links(links), credential)
            .await?;

        let representatives = select_representatives(&reply, links);
        if representatives.is_empty() {
            tracing::warn!(
                reply = %reply,
                "Deduplication reply contained no known URLs, auditing every candidate"
            );
            return Ok(links.to_vec());
        }

        Ok(representatives)
    }

    /// Requests an audit of a single chunk
    pub async fn audit_chunk(
        &self,
        page_url: &Url,
        chunk: &Chunk,
        total_chunks: usize,
        site_facts: &SiteFacts,
        page_facts: &PageFacts,
        credential: &str,
    ) -> Result<AuditReport, AuditError> {
        tracing::debug!(url = %page_url, chunk = chunk.index, total_chunks, "Auditing chunk");

        let prompt = prompts::chunk_audit(page_url, chunk, total_chunks, site_facts, page_facts);
        let text = self.model.request_analysis(&prompt, credential).await?;

        Ok(AuditReport {
            text,
            provenance: Provenance::Chunk { index: chunk.index },
        })
    }

    /// Condenses several reports into one with a single model request
    ///
    /// A single report is passed through unchanged without contacting the
    /// model. `reports` must be in chunk/page order.
    pub async fn synthesize(
        &self,
        mut reports: Vec<AuditReport>,
        provenance: Provenance,
        credential: &str,
    ) -> Result<AuditReport, AuditError> {
        if reports.len() == 1 {
            let only = reports.remove(0);
            return Ok(AuditReport {
                text: only.text,
                provenance,
            });
        }

        if reports.is_empty() {
            return Err(AuditError::NothingAudited);
        }

        let texts: Vec<String> = reports.into_iter().map(|r| r.text).collect();
        tracing::debug!(reports = texts.len(), "Synthesizing reports");

        let text = self
            .model
            .request_analysis(&prompts::synthesis(&texts), credential)
            .await?;

        Ok(AuditReport { text, provenance })
    }
}

/// Parses a comma-separated list of URLs, keeping known candidates only
///
/// Entries are trimmed (whitespace and stray quotes), empty entries and
/// repeats are dropped, and order follows the reply.
pub fn select_representatives(reply: &str, candidates: &[Url]) -> Vec<Url> {
    let known: HashSet<String> = candidates.iter().map(link_key).collect();
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for entry in reply.split(',') {
        let entry = entry.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`');
        if entry.is_empty() {
            continue;
        }

        let url = match Url::parse(entry) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(entry = %entry, error = %e, "Ignoring unparsable deduplication entry");
                continue;
            }
        };

        let key = link_key(&url);
        if !known.contains(&key) {
            tracing::debug!(url = %url, "Ignoring deduplication entry outside the candidate list");
            continue;
        }

        if seen.insert(key) {
            selected.push(url);
        }
    }

    selected
}

fn link_key(url: &Url) -> String {
    normalize_url(url.as_str())
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

//! Prompt templates sent to the model

use crate::audit::Chunk;
use crate::crawler::PageFacts;
use crate::robots::SiteFacts;
use url::Url;

/// Prompt asking for an SEO audit of one chunk of a page's HTML
///
/// `page` holds checks computed over the whole page, so a chunk without a
/// `<head>` is not mistaken for a page without a title.
pub fn chunk_audit(
    page_url: &Url,
    chunk: &Chunk,
    total_chunks: usize,
    site: &SiteFacts,
    page: &PageFacts,
) -> String {
    format!(
        "You are an SEO auditor. Audit the following HTML from {url} \
(part {part} of {total}).\n\
The page checks below were measured on the whole page; treat them as facts about \
title, meta description, H1 count, image alt text, canonical link and viewport, \
and do not re-judge those from this part alone. \
Then review heading structure, internal linking, structured data and any other \
on-page SEO issue visible in this part; other parts are audited separately.\n\
For every issue give the element, what is wrong and a concrete fix.\n\n\
Page checks:\n{page}\n\n\
Site checks:\n{site}\n\n\
HTML:\n{html}",
        url = page_url,
        part = chunk.index + 1,
        total = total_chunks,
        page = page,
        site = site,
        html = chunk.text,
    )
}

/// Prompt asking the model to merge several audit reports into one
pub fn synthesis(reports: &[String]) -> String {
    let mut prompt = String::from(
        "You are an SEO auditor. The reports below were written for parts of the same \
audit. Combine them into one clear report: merge duplicate findings, keep every \
distinct issue with its fix, group issues by page where pages are named, and finish \
with a prioritised list of the most important fixes.\n",
    );

    for (index, report) in reports.iter().enumerate() {
        prompt.push_str(&format!("\n--- Report {} ---\n{}\n", index + 1, report));
    }

    prompt
}

/// Prompt asking the model to keep one URL per page template
pub fn deduplicate_links(links: &[Url]) -> String {
    let list = links
        .iter()
        .map(Url::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are given a list of URLs from one website. Group them by structural pattern: \
URLs that share a path template (for example /hotels/paris and /hotels/rome both \
match /hotels/{{slug}}) belong to the same group, URLs that differ only in their \
query string count as their base path, and exact duplicates are collapsed. \
Keep exactly one representative URL per group, copied verbatim from the list.\n\
Reply with the representative URLs only, separated by commas, with no other text.\n\n\
URLs: {list}"
    )
}

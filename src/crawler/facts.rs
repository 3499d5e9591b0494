//! Deterministic on-page SEO checks
//!
//! These are computed from the whole document before it is split into
//! chunks, so every chunk prompt sees the same page-level facts.

use scraper::{Html, Selector};
use std::fmt;
use std::ops::RangeInclusive;

/// Title lengths (in characters) considered healthy
pub const TITLE_LENGTH_OK: RangeInclusive<usize> = 10..=70;

/// Meta description lengths (in characters) considered healthy
pub const DESCRIPTION_LENGTH_OK: RangeInclusive<usize> = 50..=160;

/// Number of image sources listed as examples of missing alt text
pub const MISSING_ALT_EXAMPLES: usize = 5;

/// Facts about one HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFacts {
    /// Trimmed `<title>` text, empty when missing
    pub title: String,

    /// Trimmed `<meta name="description">` content, empty when missing
    pub meta_description: String,

    /// Text of every `<h1>` in document order
    pub h1_texts: Vec<String>,

    /// Number of `<img>` with a missing or empty `alt`
    pub images_missing_alt: usize,

    /// First few `src` values of those images
    pub missing_alt_examples: Vec<String>,

    /// `href` of `<link rel="canonical">`
    pub canonical: Option<String>,

    /// A `<meta name="viewport">` is present
    pub has_viewport: bool,
}

impl PageFacts {
    pub fn title_ok(&self) -> bool {
        TITLE_LENGTH_OK.contains(&self.title.chars().count())
    }

    pub fn description_ok(&self) -> bool {
        DESCRIPTION_LENGTH_OK.contains(&self.meta_description.chars().count())
    }

    /// Exactly one H1
    pub fn h1_ok(&self) -> bool {
        self.h1_texts.len() == 1
    }
}

impl fmt::Display for PageFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = |ok: bool| if ok { "OK" } else { "Too short/long or missing" };

        writeln!(
            f,
            "Title: \"{}\" ({} characters, {})",
            self.title,
            self.title.chars().count(),
            status(self.title_ok())
        )?;
        writeln!(
            f,
            "Meta description: \"{}\" ({} characters, {})",
            self.meta_description,
            self.meta_description.chars().count(),
            status(self.description_ok())
        )?;
        writeln!(
            f,
            "H1 tags: {} {:?} ({})",
            self.h1_texts.len(),
            self.h1_texts,
            if self.h1_ok() { "OK" } else { "Should have exactly 1" }
        )?;
        write!(f, "Images without alt: {}", self.images_missing_alt)?;
        if !self.missing_alt_examples.is_empty() {
            write!(f, " (e.g. {})", self.missing_alt_examples.join(", "))?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Canonical: {}",
            self.canonical.as_deref().unwrap_or("Missing")
        )?;
        write!(
            f,
            "Mobile responsive: {}",
            if self.has_viewport {
                "Yes"
            } else {
                "No (missing viewport tag)"
            }
        )
    }
}

/// Runs the on-page checks over a whole HTML document
pub fn extract_page_facts(html: &str) -> PageFacts {
    let document = Html::parse_document(html);

    let title = first_text(&document, "title").unwrap_or_default();
    let meta_description = first_attr(&document, "meta[name='description']", "content")
        .unwrap_or_default();

    let h1_texts = select_all(&document, "h1")
        .into_iter()
        .map(|h1| collapse_whitespace(&h1.text().collect::<String>()))
        .collect();

    let missing_alt: Vec<String> = select_all(&document, "img")
        .into_iter()
        .filter(|img| img.value().attr("alt").map_or(true, str::is_empty))
        .map(|img| img.value().attr("src").unwrap_or("(no src)").to_string())
        .collect();

    PageFacts {
        title,
        meta_description,
        h1_texts,
        images_missing_alt: missing_alt.len(),
        missing_alt_examples: missing_alt.into_iter().take(MISSING_ALT_EXAMPLES).collect(),
        canonical: first_attr(&document, "link[rel='canonical']", "href"),
        has_viewport: !select_all(&document, "meta[name='viewport']").is_empty(),
    }
}

fn select_all<'a>(document: &'a Html, selector: &str) -> Vec<scraper::ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    select_all(document, selector)
        .first()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    select_all(document, selector)
        .first()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

//! Crawl state for one link discovery run
//!
//! Holds the breadth-first frontier and the set of visited pages, keyed by
//! normalized URL.

use crate::url::normalize_url;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Frontier and visited set of a bounded breadth-first crawl
///
/// Invariants:
/// - `visited_count() <= page_limit()`
/// - a URL is marked visited at most once
/// - a URL that is already visited is never enqueued
#[derive(Debug, Clone)]
pub struct CrawlState {
    visited: HashSet<String>,
    /// Other addresses of visited pages, e.g. the target of a redirect
    aliases: HashSet<String>,
    frontier: VecDeque<Url>,
    page_limit: usize,
}

impl CrawlState {
    /// Creates a crawl state whose frontier holds only `start`
    ///
    /// A `page_limit` of zero is raised to one so the start page is always
    /// considered.
    pub fn new(start: Url, page_limit: usize) -> Self {
        let mut frontier = VecDeque::new();
        frontier.push_back(start);

        Self {
            visited: HashSet::new(),
            aliases: HashSet::new(),
            frontier,
            page_limit: page_limit.max(1),
        }
    }

    /// Pops the next URL that still needs fetching
    ///
    /// Returns `None` once the page limit is reached or the frontier runs dry.
    /// Entries visited after they were enqueued are discarded here.
    pub fn next_url(&mut self) -> Option<Url> {
        while !self.limit_reached() {
            let url = self.frontier.pop_front()?;
            if !self.is_visited(&url) {
                return Some(url);
            }
        }
        None
    }

    /// Records a successful fetch of `url`
    ///
    /// Returns `false` if the URL was already visited or the limit is reached.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        if self.limit_reached() {
            return false;
        }
        let key = visit_key(url);
        if self.aliases.contains(&key) {
            return false;
        }
        self.visited.insert(key)
    }

    /// Records `alias` as another address of a page that is already visited
    ///
    /// Aliases are never fetched again and do not count towards the limit.
    pub fn mark_alias(&mut self, alias: &Url) {
        let key = visit_key(alias);
        if !self.visited.contains(&key) {
            self.aliases.insert(key);
        }
    }

    /// Adds `url` to the back of the frontier unless it was already visited
    pub fn enqueue(&mut self, url: Url) -> bool {
        if self.is_visited(&url) {
            return false;
        }
        self.frontier.push_back(url);
        true
    }

    /// Returns true if `url` (after normalization) has been visited
    pub fn is_visited(&self, url: &Url) -> bool {
        let key = visit_key(url);
        self.visited.contains(&key) || self.aliases.contains(&key)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn page_limit(&self) -> usize {
        self.page_limit
    }

    /// Returns true when no more pages may be visited
    pub fn limit_reached(&self) -> bool {
        self.visited.len() >= self.page_limit
    }
}

/// Identity of a URL inside the visited set
fn visit_key(url: &Url) -> String {
    normalize_url(url.as_str())
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

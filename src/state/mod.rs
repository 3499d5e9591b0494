//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the frontier queue, visited set and page limit of one
//!   link discovery run. Each audit request owns its own instance.

mod crawl_state;

pub use crawl_state::CrawlState;

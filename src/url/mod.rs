//! URL handling module
//!
//! This module provides URL normalization, host extraction and the
//! same-origin check used to keep link discovery on one site.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_same_origin, origin_base};
pub use normalize::normalize_url;

//! SEO Audit Agent: crawls web pages and produces AI-written SEO audits
//!
//! This crate implements an audit pipeline that discovers pages on a site,
//! splits their content into model-sized chunks, asks an external
//! text-generation endpoint to audit and summarise them, and delivers the
//! final report (or the failure) to a caller-supplied webhook.

pub mod audit;
pub mod config;
pub mod crawler;
pub mod delivery;
pub mod model;
pub mod pipeline;
pub mod robots;
pub mod server;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for an audit run
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Model request failed: {0}")]
    Model(#[from] model::ModelError),

    #[error("Page could not be fetched: {url}")]
    Unreachable { url: String },

    #[error("None of the requested pages could be audited")]
    NothingAudited,

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

// Re-export commonly used types
pub use audit::{AuditReport, Auditor, Chunk};
pub use config::Config;
pub use pipeline::{AuditRequest, AuditScope};
pub use state::CrawlState;
pub use url::{is_same_origin, normalize_url};

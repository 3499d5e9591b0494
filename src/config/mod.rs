//! Configuration module for the audit agent
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use seo_auditor::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawls stop after {} pages", config.crawler.page_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AuditConfig, Config, CrawlerConfig, ModelConfig, ServerConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, CREDENTIAL_ENV_VAR};

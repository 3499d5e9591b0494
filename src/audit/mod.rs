//! Audit module
//!
//! This module turns fetched pages into audit reports:
//! - `segmenter`: splits large documents into line-bounded chunks
//! - `prompts`: the instructions sent to the model
//! - `orchestrator`: chunk audits, template deduplication and synthesis

mod orchestrator;
pub mod prompts;
mod segmenter;

pub use orchestrator::{select_representatives, Auditor};
pub use segmenter::{segment, Chunk};

use url::Url;

/// Where an audit report came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Audit of a single chunk
    Chunk { index: usize },

    /// Synthesis of one page's chunk reports
    Page { url: Url },

    /// Synthesis of several page reports
    Site,
}

/// Free-text audit result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    pub text: String,
    pub provenance: Provenance,
}

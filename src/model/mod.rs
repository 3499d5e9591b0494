//! Text-generation endpoint client
//!
//! One request per prompt: the prompt is sent as a single system message and
//! the first choice's content comes back. Every failure is an explicit
//! [`ModelError`] so the pipeline can abort the request and report it.

mod client;
mod types;

pub use client::{ModelClient, API_KEY_HEADER, MODEL_HEADER, UNAVAILABLE_RESPONSE};
pub use types::{ChatRequest, ChatResponse, Message};

use thiserror::Error;

/// Model request errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// Connection failed or the body could not be read
    #[error("Network error: {0}")]
    Network(String),

    /// Connect or overall request timeout elapsed
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Endpoint answered with a non-2xx status
    #[error("Endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body is not valid JSON for the expected schema
    #[error("Parse error: {0}")]
    Parse(String),

    /// A required response field was missing
    #[error("Response is missing required field `{0}`")]
    MissingField(&'static str),
}

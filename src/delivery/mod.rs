//! Terminal delivery of audit outcomes
//!
//! Every accepted request ends with exactly one webhook post: either a
//! completed task carrying the report or an error carrying the failure.

mod reporter;
pub mod task;

pub use reporter::{DeliveryReporter, DeliveryTarget};
pub use task::{Task, TaskState};

use thiserror::Error;

/// Final result of one audit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Completed { report: String },
    Failed { message: String },
}

/// Webhook delivery errors
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Webhook unreachable: {0}")]
    Network(String),

    #[error("Webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

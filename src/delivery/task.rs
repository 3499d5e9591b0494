//! Task / message / artifact payloads sent to callers
//!
//! These mirror the agent-to-agent JSON-RPC protocol the front door speaks:
//! camelCase field names, a `kind` discriminator on every object, and task
//! states in lowercase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// JSON-RPC error code for failures inside the agent
pub const INTERNAL_ERROR: i64 = -32603;

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Submitted,
    Completed,
    Failed,
}

/// A piece of message or artifact content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    Text { text: String },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// A message authored by the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub kind: String,
    pub message_id: String,
    pub role: String,
    pub parts: Vec<Part>,
}

impl Message {
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            kind: "message".to_string(),
            message_id: Uuid::new_v4().simple().to_string(),
            role: "agent".to_string(),
            parts: vec![Part::text(text)],
        }
    }
}

/// Output produced by a task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub artifact_id: String,
    pub parts: Vec<Part>,
}

impl Artifact {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            artifact_id: Uuid::new_v4().simple().to_string(),
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    pub timestamp: DateTime<Utc>,
}

/// A unit of work as seen by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub kind: String,
    pub id: String,
    pub context_id: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub artifacts: Vec<Artifact>,
}

impl Task {
    /// Creates a task in `state` with an agent status message
    pub fn new(
        id: impl Into<String>,
        context_id: impl Into<String>,
        state: TaskState,
        status_text: impl Into<String>,
    ) -> Self {
        Self {
            kind: "task".to_string(),
            id: id.into(),
            context_id: context_id.into(),
            status: TaskStatus {
                state,
                message: Some(Message::agent(status_text)),
                timestamp: Utc::now(),
            },
            artifacts: Vec::new(),
        }
    }

    /// Acknowledgement returned synchronously when a request is accepted
    pub fn submitted(id: impl Into<String>, context_id: impl Into<String>) -> Self {
        Self::new(id, context_id, TaskState::Submitted, "In progress")
    }

    /// Finished task carrying the report as its only artifact
    pub fn completed(
        id: impl Into<String>,
        context_id: impl Into<String>,
        report: impl Into<String>,
    ) -> Self {
        let mut task = Self::new(id, context_id, TaskState::Completed, "Success!");
        task.artifacts.push(Artifact::text(report));
        task
    }

    /// Task that ended with `error`
    pub fn failed(
        id: impl Into<String>,
        context_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self::new(id, context_id, TaskState::Failed, error)
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, task: Task) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(task),
            error: None,
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data,
            }),
        }
    }
}

use crate::delivery::task::{RpcResponse, Task, INTERNAL_ERROR};
use crate::delivery::{DeliveryError, DeliveryOutcome};
use crate::model::API_KEY_HEADER;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Timeout for a single webhook post
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// Identifies the caller a terminal outcome is delivered to
#[derive(Debug, Clone)]
pub struct DeliveryTarget {
    /// JSON-RPC id of the original request
    pub request_id: Value,
    pub task_id: String,
    pub context_id: String,
    pub webhook_url: String,
    pub credential: String,
}

/// Posts terminal task states to caller webhooks
///
/// Each call makes exactly one attempt. Failures are logged and returned;
/// they are never retried.
#[derive(Debug, Clone)]
pub struct DeliveryReporter {
    client: Client,
}

impl DeliveryReporter {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// Delivers `outcome` to the target's webhook
    pub async fn deliver(
        &self,
        target: &DeliveryTarget,
        outcome: DeliveryOutcome,
    ) -> Result<(), DeliveryError> {
        match outcome {
            DeliveryOutcome::Completed { report } => self.deliver_success(target, &report).await,
            DeliveryOutcome::Failed { message } => self.deliver_failure(target, &message).await,
        }
    }

    /// Posts a completed task whose artifact carries `report_text`
    pub async fn deliver_success(
        &self,
        target: &DeliveryTarget,
        report_text: &str,
    ) -> Result<(), DeliveryError> {
        let task = Task::completed(&target.task_id, &target.context_id, report_text);
        let payload = RpcResponse::success(target.request_id.clone(), task);
        self.post(target, &payload).await
    }

    /// Posts a JSON-RPC error carrying `error_message` and the failed task
    pub async fn deliver_failure(
        &self,
        target: &DeliveryTarget,
        error_message: &str,
    ) -> Result<(), DeliveryError> {
        let task = Task::failed(&target.task_id, &target.context_id, error_message);
        let data = json!({
            "taskId": target.task_id,
            "task": task,
        });
        let payload = RpcResponse::error(
            target.request_id.clone(),
            INTERNAL_ERROR,
            error_message,
            Some(data),
        );
        self.post(target, &payload).await
    }

    async fn post(&self, target: &DeliveryTarget, payload: &RpcResponse) -> Result<(), DeliveryError> {
        let result = self
            .client
            .post(&target.webhook_url)
            .header(API_KEY_HEADER, &target.credential)
            .json(payload)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => return Err(DeliveryError::Network(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(task_id = %target.task_id, webhook = %target.webhook_url, "Delivered task outcome");
        Ok(())
    }
}

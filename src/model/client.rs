use crate::config::ModelConfig;
use crate::model::types::{ChatRequest, ChatResponse};
use crate::model::ModelError;
use reqwest::Client;
use std::time::Duration;

/// Header carrying the caller's credential
pub const API_KEY_HEADER: &str = "X-TELEX-API-KEY";

/// Header carrying the model identifier
pub const MODEL_HEADER: &str = "X-Model-ID";

/// Returned when the endpoint answers without any message content
pub const UNAVAILABLE_RESPONSE: &str = "Response not available";

/// Client for the external text-generation endpoint
#[derive(Debug, Clone)]
pub struct ModelClient {
    http_client: Client,
    endpoint: String,
    model: String,
}

impl ModelClient {
    /// Builds a client from the model configuration
    ///
    /// The connect timeout bounds connection establishment; the request
    /// timeout bounds the whole exchange including reading the body.
    pub fn new(config: &ModelConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }

    /// Sends one prompt and returns the model's answer
    ///
    /// An intact response without content yields [`UNAVAILABLE_RESPONSE`].
    /// Network failures, non-2xx statuses, undecodable bodies and missing
    /// response fields are errors.
    pub async fn request_analysis(
        &self,
        prompt: &str,
        credential: &str,
    ) -> Result<String, ModelError> {
        let request = ChatRequest::system_prompt(&self.model, prompt);

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending model request"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, credential)
            .header(MODEL_HEADER, &self.model)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout(e.to_string())
                } else {
                    ModelError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout(e.to_string())
            } else {
                ModelError::Network(e.to_string())
            }
        })?;

        let parsed: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ModelError::Parse(format!("Failed to decode response: {}", e)))?;

        match parsed.into_content()? {
            Some(content) => Ok(content),
            None => {
                tracing::warn!(model = %self.model, "Model response carried no content");
                Ok(UNAVAILABLE_RESPONSE.to_string())
            }
        }
    }
}

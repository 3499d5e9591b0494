//! Chat endpoint request and response types.

use serde::{Deserialize, Serialize};

use super::ModelError;

/// Chat request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,

    /// Conversation messages
    pub messages: Vec<Message>,

    /// Always false: the pipeline needs the complete answer
    pub stream: bool,
}

impl ChatRequest {
    /// Builds a non-streaming request carrying a single system prompt.
    pub fn system_prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message::system(prompt)],
            stream: false,
        }
    }
}

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// Response envelope: `{ "data": { "choices": [ { "message": { "content": ... } } ] } }`
///
/// Every level is optional so that a missing field surfaces as a
/// [`ModelError::MissingField`] naming the path instead of a serde error.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub data: Option<ResponseData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseData {
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Extracts the first choice's message content.
    ///
    /// `Ok(None)` means the structure was intact but the content was absent
    /// or null.
    pub fn into_content(self) -> Result<Option<String>, ModelError> {
        let data = self.data.ok_or(ModelError::MissingField("data"))?;
        let choices = data.choices.ok_or(ModelError::MissingField("data.choices"))?;
        let first = choices
            .into_iter()
            .next()
            .ok_or(ModelError::MissingField("data.choices[0]"))?;
        let message = first
            .message
            .ok_or(ModelError::MissingField("data.choices[0].message"))?;
        Ok(message.content)
    }
}

//! Incoming JSON-RPC request shapes and target extraction

use crate::pipeline::AuditScope;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// JSON-RPC error code for an unparsable body
pub const PARSE_ERROR: i64 = -32700;

/// JSON-RPC error code for a well-formed request with unusable params
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Value,
    pub params: MessageSendParams,
}

#[derive(Debug, Deserialize)]
pub struct MessageSendParams {
    pub message: IncomingMessage,
    pub configuration: SendConfiguration,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub parts: Vec<IncomingPart>,
    #[serde(default)]
    pub metadata: MessageMetadata,
}

#[derive(Debug, Deserialize)]
pub struct IncomingPart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageMetadata {
    #[serde(default)]
    pub telex_user_id: Option<String>,
    #[serde(default)]
    pub audit_scope: Option<AuditScope>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendConfiguration {
    pub push_notification_config: PushNotificationConfig,
}

#[derive(Debug, Deserialize)]
pub struct PushNotificationConfig {
    pub url: String,
    #[serde(default)]
    pub authentication: Option<PushAuthentication>,
}

#[derive(Debug, Deserialize)]
pub struct PushAuthentication {
    #[serde(default)]
    pub credentials: Option<String>,
}

impl RpcRequest {
    /// Text of the first message part, if it is non-empty
    pub fn first_text(&self) -> Option<&str> {
        self.params
            .message
            .parts
            .first()
            .and_then(|part| part.text.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Credential supplied by the caller for the webhook and model calls
    pub fn credential(&self) -> Option<&str> {
        self.params
            .configuration
            .push_notification_config
            .authentication
            .as_ref()
            .and_then(|auth| auth.credentials.as_deref())
            .filter(|c| !c.trim().is_empty())
    }
}

/// Extracts the URLs to audit from free message text
///
/// Tokens are separated by whitespace or commas. Tokens starting with
/// `http://` or `https://` are taken as URLs; tokens starting with `www.`
/// get `https://` prepended. Trailing sentence punctuation is ignored and
/// repeated URLs are kept once.
pub fn parse_targets(text: &str) -> Vec<Url> {
    let mut targets: Vec<Url> = Vec::new();

    for token in text.split(|c: char| c.is_whitespace() || c == ',') {
        let token = token
            .trim_matches(|c| c == '<' || c == '>' || c == '"' || c == '\'')
            .trim_end_matches(['.', ';', ':', '!', '?', ')']);
        let lowered = token.to_ascii_lowercase();

        let candidate = if lowered.starts_with("http://") || lowered.starts_with("https://") {
            token.to_string()
        } else if lowered.starts_with("www.") {
            format!("https://{}", token)
        } else {
            continue;
        };

        match Url::parse(&candidate) {
            Ok(url) if url.host_str().is_some() => {
                if !targets.contains(&url) {
                    targets.push(url);
                }
            }
            _ => tracing::debug!(token = %token, "Ignoring token that is not a URL"),
        }
    }

    targets
}

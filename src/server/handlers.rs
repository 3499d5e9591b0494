use crate::delivery::task::{RpcResponse, Task};
use crate::pipeline::{spawn_audit, AuditRequest, AuditScope};
use crate::server::rpc::{parse_targets, RpcRequest, INVALID_PARAMS, PARSE_ERROR};
use crate::server::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Html;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

/// Header a reverse proxy sets to the public base URL of this agent
pub const EXTERNAL_BASE_URL_HEADER: &str = "x-external-base-url";

type RpcReply = (StatusCode, Json<RpcResponse>);

pub async fn root_handler() -> Html<&'static str> {
    Html("<h1>SEO Audit Agent</h1><p>Send JSON-RPC <code>message/send</code> requests to this URL.</p>")
}

/// Serves the agent card describing this agent's single skill
pub async fn agent_card_handler(headers: HeaderMap) -> Json<Value> {
    let base_url = public_base_url(&headers);

    Json(json!({
        "name": "SEO Audit Agent",
        "description": "Audits web pages and sites for search engine optimisation issues and returns a prioritised report.",
        "url": base_url,
        "version": env!("CARGO_PKG_VERSION"),
        "provider": {
            "organization": "SEO Audit Agent",
            "url": base_url,
        },
        "capabilities": {
            "streaming": false,
            "pushNotifications": true,
            "stateTransitionHistory": false,
        },
        "defaultInputModes": ["text/plain"],
        "defaultOutputModes": ["text/plain"],
        "skills": [{
            "id": "seo-audit",
            "name": "SEO audit",
            "description": "Audits one page, or crawls a site and audits one page per template.",
            "tags": ["seo", "audit", "crawler"],
            "examples": ["https://example.com", "https://example.com/blog https://example.com/shop"],
        }],
    }))
}

/// Accepts a `message/send` call and starts the audit in the background
///
/// The caller gets a submitted task back immediately; the final outcome is
/// posted to its push notification URL.
pub async fn rpc_handler(State(state): State<AppState>, body: Bytes) -> RpcReply {
    let request: RpcRequest = match serde_json::from_slice::<Value>(&body) {
        Err(e) => {
            tracing::warn!(error = %e, "Rejected unparsable request body");
            return rpc_error(StatusCode::BAD_REQUEST, Value::Null, PARSE_ERROR, "Parse error");
        }
        Ok(value) => {
            let id = value.get("id").cloned().unwrap_or(Value::Null);
            match serde_json::from_value(value) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!(error = %e, "Rejected malformed message/send params");
                    return rpc_error(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        id,
                        INVALID_PARAMS,
                        "Invalid params",
                    );
                }
            }
        }
    };

    let id = request.id.clone();

    let Some(text) = request.first_text() else {
        return rpc_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            id,
            INVALID_PARAMS,
            "Message must contain a text part",
        );
    };

    let targets = parse_targets(text);
    if targets.is_empty() {
        return rpc_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            id,
            INVALID_PARAMS,
            "Message does not contain a URL to audit",
        );
    }

    let webhook_url = request.params.configuration.push_notification_config.url.trim();
    if url::Url::parse(webhook_url).is_err() {
        return rpc_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            id,
            INVALID_PARAMS,
            "Push notification URL is not valid",
        );
    }

    let credential = match request
        .credential()
        .map(str::to_string)
        .or_else(|| state.default_credential.clone())
    {
        Some(credential) => credential,
        None => {
            return rpc_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                id,
                INVALID_PARAMS,
                "No credential supplied",
            );
        }
    };

    let metadata = &request.params.message.metadata;
    let scope = metadata
        .audit_scope
        .unwrap_or_else(|| AuditScope::infer(targets.len()));

    let audit = AuditRequest {
        request_id: id.clone(),
        task_id: Uuid::new_v4().simple().to_string(),
        context_id: Uuid::new_v4().simple().to_string(),
        user_id: metadata.telex_user_id.clone(),
        targets,
        scope,
        webhook_url: webhook_url.to_string(),
        credential,
    };

    tracing::info!(
        task_id = %audit.task_id,
        targets = audit.targets.len(),
        scope = ?audit.scope,
        "Accepted audit request"
    );

    let task = Task::submitted(&audit.task_id, &audit.context_id);
    // Detached: the outcome reaches the caller through the webhook only
    let _ = spawn_audit(state.auditor.clone(), state.reporter.clone(), audit);

    (StatusCode::OK, Json(RpcResponse::success(id, task)))
}

fn rpc_error(status: StatusCode, id: Value, code: i64, message: &str) -> RpcReply {
    (status, Json(RpcResponse::error(id, code, message, None)))
}

fn public_base_url(headers: &HeaderMap) -> String {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(external) = header_str(EXTERNAL_BASE_URL_HEADER) {
        return external.trim_end_matches('/').to_string();
    }

    match header_str(header::HOST.as_str()) {
        Some(host) => format!("http://{}", host),
        None => "http://localhost".to_string(),
    }
}

//! HTTP front door
//!
//! Speaks the agent-to-agent JSON-RPC protocol: `POST /` accepts
//! `message/send`, `GET /.well-known/agent.json` serves the agent card.

mod handlers;
pub mod rpc;

pub use handlers::EXTERNAL_BASE_URL_HEADER;

use crate::audit::Auditor;
use crate::config::ServerConfig;
use crate::delivery::DeliveryReporter;
use crate::AuditError;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// State shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub auditor: Arc<Auditor>,
    pub reporter: Arc<DeliveryReporter>,
    /// Used when a caller does not send its own credential
    pub default_credential: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route(
            "/",
            get(handlers::root_handler).post(handlers::rpc_handler),
        )
        .route("/.well-known/agent.json", get(handlers::agent_card_handler))
        .layer(trace_layer)
        .with_state(state)
}

/// Binds the configured address and serves until the process exits
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<(), AuditError> {
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

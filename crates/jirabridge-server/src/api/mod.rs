//! HTTP façade over the ticket operations

pub mod error;
pub mod tickets;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;

use crate::mcp::{JsonRpcRequest, McpServer};
use crate::tickets::TicketService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TicketService>,
    pub mcp: Arc<McpServer>,
}

impl AppState {
    pub fn new(service: Arc<TicketService>) -> Self {
        let mcp = Arc::new(McpServer::new(service.clone()));
        Self { service, mcp }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(mcp_rpc))
        .route("/health", get(health))
        .route("/api/jira/tickets/recent", get(tickets::recent))
        .route("/api/jira/tickets/assigned", get(tickets::assigned))
        .route("/api/jira/tickets/project/{key}", get(tickets::by_project))
        .route("/api/jira/tickets/search", get(tickets::search))
        .route("/api/jira/tickets/search/text", get(tickets::search_text))
        .route("/api/jira/ticket/{key}", get(tickets::get_ticket))
        .route("/api/jira/ticket/{key}/transitions", get(tickets::transitions))
        .route("/api/jira/ticket/{key}/status", post(tickets::change_status))
        .with_state(state)
}

pub async fn start_server(state: AppState, addr: &str) -> anyhow::Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    let local: SocketAddr = listener.local_addr()?;
    info!("web server listening on: {}", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "service": "jirabridge" }))
}

/// POST /
async fn mcp_rpc(State(state): State<AppState>, Json(request): Json<JsonRpcRequest>) -> Response {
    match state.mcp.handle_request(request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

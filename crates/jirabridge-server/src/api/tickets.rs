use axum::{
    extract::{Path, Query, State},
    Json,
};
use jirabridge_core::models::{StatusChange, Ticket, TicketDetail, TicketSummary, Transition};
use serde::{Deserialize, Serialize};

use super::{error::ApiError, AppState};
use crate::tickets::limit;

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    jql: String,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextSearchQuery {
    #[serde(default)]
    text: String,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusBody {
    #[serde(default, alias = "status_name")]
    status: String,
}

#[derive(Debug, Serialize)]
pub struct TransitionsBody {
    pub transitions: Vec<Transition>,
}

fn parse_limit(raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    Ok(raw.map(limit::parse).transpose()?)
}

fn summaries(tickets: Vec<Ticket>) -> Json<Vec<TicketSummary>> {
    Json(tickets.iter().map(TicketSummary::from).collect())
}

/// GET /api/jira/tickets/recent
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<TicketSummary>> {
    let limit = parse_limit(query.limit.as_deref())?;
    let tickets = state.service.get_recently_updated_tickets(limit).await?;
    Ok(summaries(tickets))
}

/// GET /api/jira/tickets/assigned
pub async fn assigned(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<TicketSummary>> {
    let limit = parse_limit(query.limit.as_deref())?;
    let tickets = state.service.get_my_assigned_tickets(limit).await?;
    Ok(summaries(tickets))
}

/// GET /api/jira/tickets/project/{key}
pub async fn by_project(
    State(state): State<AppState>,
    Path(project_key): Path<String>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<TicketSummary>> {
    let limit = parse_limit(query.limit.as_deref())?;
    let tickets = state
        .service
        .get_tickets_by_project(&project_key, limit)
        .await?;
    Ok(summaries(tickets))
}

/// GET /api/jira/tickets/search
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<TicketSummary>> {
    let limit = parse_limit(query.limit.as_deref())?;
    let tickets = state.service.search_tickets(&query.jql, limit).await?;
    Ok(summaries(tickets))
}

/// GET /api/jira/tickets/search/text
pub async fn search_text(
    State(state): State<AppState>,
    Query(query): Query<TextSearchQuery>,
) -> ApiResult<Vec<TicketSummary>> {
    let limit = parse_limit(query.limit.as_deref())?;
    let tickets = state
        .service
        .search_tickets_by_text(&query.text, limit)
        .await?;
    Ok(summaries(tickets))
}

/// GET /api/jira/ticket/{key}
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_key): Path<String>,
) -> ApiResult<TicketDetail> {
    let ticket = state.service.get_ticket(&ticket_key).await?;
    Ok(Json(TicketDetail::from(&ticket)))
}

/// GET /api/jira/ticket/{key}/transitions
pub async fn transitions(
    State(state): State<AppState>,
    Path(ticket_key): Path<String>,
) -> ApiResult<TransitionsBody> {
    let transitions = state.service.get_ticket_transitions(&ticket_key).await?;
    Ok(Json(TransitionsBody { transitions }))
}

/// POST /api/jira/ticket/{key}/status
pub async fn change_status(
    State(state): State<AppState>,
    Path(ticket_key): Path<String>,
    Json(body): Json<ChangeStatusBody>,
) -> ApiResult<StatusChange> {
    let change = state
        .service
        .change_ticket_status(&ticket_key, &body.status)
        .await?;
    Ok(Json(change))
}

//! Ticket operations
//!
//! Each operation validates its scalar inputs, translates them into a Jira
//! call and hands back normalized models. Errors from the client pass
//! through untouched; workflow rules stay in Jira.

use chrono::{DateTime, Duration, Utc};
use jirabridge_core::models::{
    transition::find_transition, Config, LimitConfig, StatusChange, Ticket, Transition,
};
use jirabridge_jira::{jql, Error, JiraClient, Result};
use tracing::{debug, info};

use super::limit;

/// Window used by [`TicketService::get_recently_updated_tickets`].
pub const RECENT_DAYS: u32 = 7;

pub struct TicketService {
    client: JiraClient,
    limits: LimitConfig,
}

impl TicketService {
    pub fn new(client: JiraClient, limits: LimitConfig) -> Self {
        Self { client, limits }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = JiraClient::new(&config.jira)?;
        Ok(Self::new(client, config.limits))
    }

    pub fn limits(&self) -> &LimitConfig {
        &self.limits
    }

    pub async fn get_ticket(&self, ticket_key: &str) -> Result<Ticket> {
        let key = ticket_key_param(ticket_key)?;
        info!("Getting ticket: {}", key);
        self.client.get_issue(key).await
    }

    pub async fn search_tickets(&self, jql_query: &str, limit: Option<i64>) -> Result<Vec<Ticket>> {
        let jql_query = required(jql_query, "JQL query")?;
        let max_results = limit::resolve(limit, &self.limits)?;
        info!("Searching for tickets with JQL: {}", jql_query);
        self.search(jql_query, max_results).await
    }

    pub async fn search_tickets_by_text(&self, text: &str, limit: Option<i64>) -> Result<Vec<Ticket>> {
        let text = required(text, "search text")?;
        let max_results = limit::resolve(limit, &self.limits)?;
        info!("Searching for tickets containing text: {}", text);
        self.search(&jql::text_search(text), max_results).await
    }

    pub async fn get_tickets_by_project(
        &self,
        project_key: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Ticket>> {
        let project_key = required(project_key, "project key")?;
        let max_results = limit::resolve(limit, &self.limits)?;
        info!("Getting tickets for project: {}", project_key);
        self.search(&jql::project(project_key), max_results).await
    }

    pub async fn get_my_assigned_tickets(&self, limit: Option<i64>) -> Result<Vec<Ticket>> {
        let max_results = limit::resolve(limit, &self.limits)?;
        info!("Getting my assigned tickets");
        self.search(&jql::assigned_to_current_user(), max_results)
            .await
    }

    /// Tickets updated in the last [`RECENT_DAYS`] days, newest first.
    pub async fn get_recently_updated_tickets(&self, limit: Option<i64>) -> Result<Vec<Ticket>> {
        self.recently_updated_as_of(Utc::now(), limit).await
    }

    pub(crate) async fn recently_updated_as_of(
        &self,
        now: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<Ticket>> {
        let max_results = limit::resolve(limit, &self.limits)?;
        info!("Getting recently updated tickets");

        let tickets = self
            .search(&jql::updated_within_days(RECENT_DAYS), max_results)
            .await?;
        Ok(retain_updated_since(
            tickets,
            now - Duration::days(i64::from(RECENT_DAYS)),
            max_results,
        ))
    }

    pub async fn get_ticket_transitions(&self, ticket_key: &str) -> Result<Vec<Transition>> {
        let key = ticket_key_param(ticket_key)?;
        info!("Getting transitions for ticket: {}", key);
        self.client.get_transitions(key).await
    }

    /// Move a ticket to `status_name`, matched against the target status or
    /// the transition name of the ticket's currently available transitions.
    pub async fn change_ticket_status(
        &self,
        ticket_key: &str,
        status_name: &str,
    ) -> Result<StatusChange> {
        let key = ticket_key_param(ticket_key)?;
        let status_name = required(status_name, "status name")?;
        info!("Changing status of ticket {} to {}", key, status_name);

        let transitions = self.client.get_transitions(key).await?;
        let Some(transition) = find_transition(&transitions, status_name) else {
            return Err(Error::InvalidTransition {
                ticket: key.to_string(),
                status: status_name.to_string(),
                available: transitions.iter().map(|t| t.to.name.clone()).collect(),
            });
        };

        debug!(
            transition_id = %transition.id,
            transition = %transition.name,
            "resolved transition"
        );
        self.client.transition_issue(key, &transition.id).await?;
        info!("Successfully changed status of {} to {}", key, status_name);

        let updated = self.client.get_issue(key).await?;
        Ok(StatusChange::applied(status_name, &updated))
    }

    async fn search(&self, jql_query: &str, max_results: u32) -> Result<Vec<Ticket>> {
        let tickets = self.client.search(jql_query, max_results).await?;
        info!("Found {} tickets", tickets.len());
        Ok(tickets)
    }
}

fn required<'a>(value: &'a str, name: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::required(name));
    }
    Ok(trimmed)
}

/// Issue keys (`PROJ-123`) and numeric ids only.
fn ticket_key_param(value: &str) -> Result<&str> {
    let key = required(value, "ticket key")?;
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::InvalidQuery(format!("invalid ticket key '{}'", key)));
    }
    Ok(key)
}

/// Keep tickets whose `updated` timestamp is at or after `cutoff`.
fn retain_updated_since(tickets: Vec<Ticket>, cutoff: DateTime<Utc>, max: u32) -> Vec<Ticket> {
    tickets
        .into_iter()
        .filter(|t| t.updated_at().is_some_and(|updated| updated >= cutoff))
        .take(max as usize)
        .collect()
}

//! Ticket data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized snapshot of a single Jira issue.
///
/// Built from exactly one Jira response and never cached; every call fetches
/// a fresh copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: String,
    pub key: String,
    pub self_url: Option<String>,
    pub project_key: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub issue_type: Option<String>,
    pub assignee: Option<User>,
    pub reporter: Option<User>,
    pub created: Option<String>,
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
}

impl Ticket {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.as_deref().and_then(parse_jira_timestamp)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated.as_deref().and_then(parse_jira_timestamp)
    }

    pub fn assignee_name(&self) -> Option<String> {
        self.assignee.as_ref().and_then(|u| u.display_name.clone())
    }
}

/// Project key encoded in an issue key (`PROJ-123` -> `PROJ`).
pub fn project_key_of(ticket_key: &str) -> Option<&str> {
    ticket_key
        .rsplit_once('-')
        .map(|(project, _)| project)
        .filter(|project| !project.is_empty())
}

/// Parse a Jira timestamp.
///
/// Jira emits `2024-01-15T10:30:00.000+0000`, which is not RFC 3339 because
/// the offset has no colon. Both shapes are accepted.
pub fn parse_jira_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Compact ticket form used by every list response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketSummary {
    pub key: String,
    pub id: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub updated: Option<String>,
}

impl From<&Ticket> for TicketSummary {
    fn from(ticket: &Ticket) -> Self {
        Self {
            key: ticket.key.clone(),
            id: ticket.id.clone(),
            summary: ticket.summary.clone(),
            status: ticket.status.clone(),
            assignee: ticket.assignee_name(),
            updated: ticket.updated.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            display_name: user.display_name.clone(),
            email_address: user.email_address.clone(),
        }
    }
}

/// Full ticket form returned when a single ticket is requested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketDetail {
    pub key: String,
    pub id: String,
    #[serde(rename = "self")]
    pub self_url: Option<String>,
    pub project: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub issuetype: Option<String>,
    pub assignee: Option<UserView>,
    pub reporter: Option<UserView>,
    pub created: Option<String>,
    pub updated: Option<String>,
}

impl From<&Ticket> for TicketDetail {
    fn from(ticket: &Ticket) -> Self {
        Self {
            key: ticket.key.clone(),
            id: ticket.id.clone(),
            self_url: ticket.self_url.clone(),
            project: ticket.project_key.clone(),
            summary: ticket.summary.clone(),
            description: ticket.description.clone(),
            status: ticket.status.clone(),
            priority: ticket.priority.clone(),
            issuetype: ticket.issue_type.clone(),
            assignee: ticket.assignee.as_ref().map(UserView::from),
            reporter: ticket.reporter.as_ref().map(UserView::from),
            created: ticket.created.clone(),
            updated: ticket.updated.clone(),
        }
    }
}

/// Minimal ticket reference echoed after a status change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketRef {
    pub key: String,
    pub status: Option<String>,
    pub summary: Option<String>,
}

/// Outcome of a successful status transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusChange {
    pub success: bool,
    pub message: String,
    pub ticket: TicketRef,
}

impl StatusChange {
    pub fn applied(status_name: &str, ticket: &Ticket) -> Self {
        Self {
            success: true,
            message: format!("Status changed to {}", status_name),
            ticket: TicketRef {
                key: ticket.key.clone(),
                status: ticket.status.clone(),
                summary: ticket.summary.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ticket() -> Ticket {
        Ticket {
            id: "10001".to_string(),
            key: "PROJ-1".to_string(),
            self_url: Some("https://example.atlassian.net/rest/api/2/issue/10001".to_string()),
            project_key: "PROJ".to_string(),
            summary: Some("Fix login".to_string()),
            description: None,
            status: Some("In Progress".to_string()),
            priority: Some("High".to_string()),
            issue_type: Some("Bug".to_string()),
            assignee: Some(User {
                display_name: Some("Ada Lovelace".to_string()),
                email_address: Some("ada@example.com".to_string()),
            }),
            reporter: None,
            created: Some("2024-01-15T10:30:00.000+0000".to_string()),
            updated: Some("2024-01-16T08:00:00.000+0200".to_string()),
        }
    }

    #[test]
    fn test_parse_jira_timestamp() {
        let parsed = parse_jira_timestamp("2024-01-15T10:30:00.000+0000").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());

        let rfc = parse_jira_timestamp("2024-01-15T12:30:00+02:00").unwrap();
        assert_eq!(rfc, parsed);

        assert!(parse_jira_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_updated_at_normalizes_offset() {
        let updated = ticket().updated_at().unwrap();
        assert_eq!(updated, Utc.with_ymd_and_hms(2024, 1, 16, 6, 0, 0).unwrap());
    }

    #[test]
    fn test_project_key_of() {
        assert_eq!(project_key_of("PROJ-123"), Some("PROJ"));
        assert_eq!(project_key_of("MY-TEAM-7"), Some("MY-TEAM"));
        assert_eq!(project_key_of("10001"), None);
        assert_eq!(project_key_of("-5"), None);
    }

    #[test]
    fn test_summary_view() {
        let summary = TicketSummary::from(&ticket());
        assert_eq!(summary.key, "PROJ-1");
        assert_eq!(summary.assignee.as_deref(), Some("Ada Lovelace"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status"], "In Progress");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_detail_view_uses_jira_field_names() {
        let json = serde_json::to_value(TicketDetail::from(&ticket())).unwrap();
        assert_eq!(json["self"], "https://example.atlassian.net/rest/api/2/issue/10001");
        assert_eq!(json["issuetype"], "Bug");
        assert_eq!(json["project"], "PROJ");
        assert_eq!(json["assignee"]["displayName"], "Ada Lovelace");
        assert_eq!(json["assignee"]["emailAddress"], "ada@example.com");
        assert!(json["reporter"].is_null());
    }

    #[test]
    fn test_status_change() {
        let change = StatusChange::applied("In Progress", &ticket());
        assert!(change.success);
        assert_eq!(change.message, "Status changed to In Progress");
        assert_eq!(change.ticket.key, "PROJ-1");
        assert_eq!(change.ticket.status.as_deref(), Some("In Progress"));
    }
}

//! JIRA API types

use jirabridge_core::models::{ticket::project_key_of, Ticket, Transition, TransitionTarget, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Issue fields requested from the search endpoint.
pub const ISSUE_FIELDS: &str =
    "summary,description,status,priority,issuetype,assignee,reporter,project,created,updated";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
    pub id: String,
    pub key: String,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    #[serde(default)]
    pub fields: JiraFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraFields {
    pub summary: Option<String>,
    /// Plain text on API v2, an ADF document on some Cloud configurations.
    pub description: Option<Value>,
    pub status: Option<JiraStatus>,
    pub priority: Option<JiraNamed>,
    pub issuetype: Option<JiraNamed>,
    pub assignee: Option<JiraUser>,
    pub reporter: Option<JiraUser>,
    pub project: Option<JiraProject>,
    pub created: Option<String>,
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraStatus {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraNamed {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraProject {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionsResponse {
    #[serde(default)]
    pub transitions: Vec<JiraTransition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraTransition {
    pub id: String,
    pub name: String,
    pub to: Option<JiraStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub transition: TransitionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionId {
    pub id: String,
}

impl TransitionRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            transition: TransitionId { id: id.into() },
        }
    }
}

/// Error payload Jira attaches to 4xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraErrorBody {
    #[serde(default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub errors: BTreeMap<String, Value>,
}

impl JiraErrorBody {
    /// All messages joined into one line, if Jira sent any.
    pub fn message(&self) -> Option<String> {
        let mut parts = self.error_messages.clone();
        for (field, value) in &self.errors {
            match value.as_str() {
                Some(text) => parts.push(format!("{}: {}", field, text)),
                None => parts.push(format!("{}: {}", field, value)),
            }
        }

        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

impl From<JiraUser> for User {
    fn from(user: JiraUser) -> Self {
        User {
            display_name: user.display_name,
            email_address: user.email_address,
        }
    }
}

impl From<JiraIssue> for Ticket {
    fn from(issue: JiraIssue) -> Self {
        let fields = issue.fields;
        let project_key = fields
            .project
            .map(|p| p.key)
            .or_else(|| project_key_of(&issue.key).map(str::to_string))
            .unwrap_or_default();

        Ticket {
            id: issue.id,
            key: issue.key,
            self_url: issue.self_url,
            project_key,
            summary: fields.summary,
            description: fields.description.as_ref().and_then(flatten_description),
            status: fields.status.map(|s| s.name),
            priority: fields.priority.and_then(|p| p.name),
            issue_type: fields.issuetype.and_then(|t| t.name),
            assignee: fields.assignee.map(User::from),
            reporter: fields.reporter.map(User::from),
            created: fields.created,
            updated: fields.updated,
        }
    }
}

impl From<JiraTransition> for Transition {
    fn from(transition: JiraTransition) -> Self {
        let to = transition
            .to
            .map(|status| TransitionTarget {
                name: status.name,
                description: status.description,
            })
            .unwrap_or_else(|| TransitionTarget {
                name: transition.name.clone(),
                description: None,
            });

        Transition {
            id: transition.id,
            name: transition.name,
            to,
        }
    }
}

/// Render a description as plain text.
fn flatten_description(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        document => {
            let mut out = String::new();
            collect_text(document, &mut out);
            let text = out.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
    }
}

fn collect_text(node: &Value, out: &mut String) {
    let node_type = node.get("type").and_then(Value::as_str);
    if node_type == Some("hardBreak") {
        out.push('\n');
    }

    if let Some(text) = node.get("text").and_then(Value::as_str) {
        out.push_str(text);
    }

    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            collect_text(child, out);
        }
    }

    if matches!(
        node_type,
        Some("paragraph" | "heading" | "listItem" | "codeBlock" | "blockquote")
    ) && !out.ends_with('\n')
    {
        out.push('\n');
    }
}

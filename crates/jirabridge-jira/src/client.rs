//! JIRA REST client

use jirabridge_core::models::{JiraConfig, Ticket, Transition};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::auth::JiraAuth;
use crate::error::{Error, Result};
use crate::types::{
    ISSUE_FIELDS, JiraErrorBody, JiraIssue, SearchResponse, TransitionRequest,
    TransitionsResponse,
};

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Description of a single call against the REST API.
#[derive(Debug, Clone)]
pub struct JiraRequest {
    pub method: Method,
    /// Path below `/rest/api/2`, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// What the request addresses, for error messages ("ticket PROJ-1").
    pub resource: String,
}

impl JiraRequest {
    pub fn get(path: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
            resource: resource.into(),
        }
    }

    pub fn post(path: impl Into<String>, resource: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            resource: resource.into(),
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

pub struct JiraClient {
    http: reqwest::Client,
    api_base: String,
    auth: JiraAuth,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Result<Self> {
        let timeout = config.timeout();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base(),
            auth: JiraAuth::from_config(config),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Send `request` and return the response if Jira answered with 2xx.
    pub async fn send(&self, request: JiraRequest) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.api_base, request.path);
        debug!(method = %request.method, path = %request.path, "JIRA request");

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(reqwest::header::AUTHORIZATION, self.auth.header_value())
            .header(reqwest::header::ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!("JIRA request to {} failed: {}", request.path, e);
            Error::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = status_error(status, &body, &request.resource);
        if status.is_server_error() {
            error!("JIRA {} {} failed: {}", request.method, request.path, err);
        } else {
            warn!("JIRA {} {} rejected: {}", request.method, request.path, err);
        }
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: JiraRequest) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetch a single issue by key or id.
    pub async fn get_issue(&self, key: &str) -> Result<Ticket> {
        let request = JiraRequest::get(
            format!("/issue/{}", encode_segment(key)),
            format!("ticket {}", key),
        );
        let issue: JiraIssue = self.send_json(request).await?;
        Ok(Ticket::from(issue))
    }

    /// Run a JQL search returning at most `max_results` issues.
    pub async fn search(&self, jql: &str, max_results: u32) -> Result<Vec<Ticket>> {
        debug!(%jql, max_results, "JIRA search");
        let request = JiraRequest::get("/search", "search")
            .query("jql", jql)
            .query("maxResults", max_results)
            .query("fields", ISSUE_FIELDS);

        let response: SearchResponse = self.send_json(request).await?;
        Ok(response.issues.into_iter().map(Ticket::from).collect())
    }

    /// Transitions currently available for an issue.
    pub async fn get_transitions(&self, key: &str) -> Result<Vec<Transition>> {
        let request = JiraRequest::get(
            format!("/issue/{}/transitions", encode_segment(key)),
            format!("ticket {}", key),
        );
        let response: TransitionsResponse = self.send_json(request).await?;
        Ok(response
            .transitions
            .into_iter()
            .map(Transition::from)
            .collect())
    }

    /// Apply a transition by id. Jira answers 204 with no body.
    pub async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()> {
        let body = serde_json::to_value(TransitionRequest::new(transition_id))?;
        let request = JiraRequest::post(
            format!("/issue/{}/transitions", encode_segment(key)),
            format!("ticket {}", key),
            body,
        );
        self.send(request).await?;
        Ok(())
    }
}

/// Map a non-2xx response onto the error taxonomy.
pub fn status_error(status: StatusCode, body: &str, resource: &str) -> Error {
    let detail = serde_json::from_str::<JiraErrorBody>(body)
        .ok()
        .and_then(|b| b.message())
        .unwrap_or_else(|| truncate(body.trim(), MAX_ERROR_BODY_CHARS));

    let describe = |fallback: String| {
        if detail.is_empty() {
            fallback
        } else {
            format!("{}: {}", resource, detail)
        }
    };

    match status {
        StatusCode::NOT_FOUND => Error::NotFound(describe(format!("{} does not exist", resource))),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized(describe(format!(
            "credentials rejected for {} (HTTP {})",
            resource,
            status.as_u16()
        ))),
        StatusCode::BAD_REQUEST => Error::InvalidQuery(describe(format!("{} was rejected", resource))),
        other => Error::Upstream(format!(
            "{} failed with HTTP {}{}",
            resource,
            other.as_u16(),
            if detail.is_empty() {
                String::new()
            } else {
                format!(": {}", detail)
            }
        )),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Percent-encode a value for use as one path segment.
fn encode_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

//! Model Context Protocol tool server
//!
//! JSON-RPC 2.0 over newline-delimited stdio. Every tool maps one-to-one onto
//! a [`TicketService`] operation and returns the same JSON body the HTTP API
//! would.

use anyhow::Result;
use jirabridge_core::models::{Ticket, TicketDetail, TicketSummary};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::tickets::{limit, TicketService};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<Value>,
    pub id: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// Why a tool call did not produce a result.
enum ToolFailure {
    /// The call itself was malformed; reported as a JSON-RPC error.
    Rpc(JsonRpcError),
    /// The operation ran and failed; reported as an error-tagged tool result.
    Operation(jirabridge_jira::Error),
}

impl From<JsonRpcError> for ToolFailure {
    fn from(err: JsonRpcError) -> Self {
        ToolFailure::Rpc(err)
    }
}

impl From<jirabridge_jira::Error> for ToolFailure {
    fn from(err: jirabridge_jira::Error) -> Self {
        ToolFailure::Operation(err)
    }
}

pub struct McpServer {
    service: Arc<TicketService>,
}

impl McpServer {
    pub fn new(service: Arc<TicketService>) -> Self {
        Self { service }
    }

    /// Handle one request. Notifications (no id) produce no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();

        if id.is_none() {
            if request.method == "notifications/initialized" {
                tracing::info!("MCP Client initialized");
            }
            return None;
        }

        let result = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(request.params).await,
            other => Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        };

        let (result_val, error_val) = match result {
            Ok(v) => (Some(v), None),
            Err(e) => (None, Some(e)),
        };

        Some(JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: result_val,
            error: error_val,
            id,
        })
    }

    fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": { "name": "jirabridge", "version": env!("CARGO_PKG_VERSION") }
        })
    }

    fn handle_tools_list(&self) -> Value {
        let limits = self.service.limits();
        let max_results = json!({
            "type": "integer",
            "description": format!(
                "Maximum number of results to return (default: {}, max: {})",
                limits.default_limit, limits.max_limit
            ),
            "default": limits.default_limit,
            "minimum": 1
        });
        let ticket_key = json!({
            "type": "string",
            "description": "The Jira ticket key (e.g., PROJECT-123)"
        });

        json!({
            "tools": [
                {
                    "name": "get_ticket",
                    "description": "Retrieves details of a specific Jira ticket by its key",
                    "inputSchema": {
                        "type": "object",
                        "properties": { "ticket_key": ticket_key },
                        "required": ["ticket_key"]
                    }
                },
                {
                    "name": "search_tickets",
                    "description": "Searches for Jira tickets matching the given JQL query",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "jql_query": { "type": "string", "description": "JQL query to search for tickets" },
                            "max_results": max_results
                        },
                        "required": ["jql_query"]
                    }
                },
                {
                    "name": "search_tickets_by_text",
                    "description": "Searches for Jira tickets containing specific text",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "text": { "type": "string", "description": "Text to search for in tickets" },
                            "max_results": max_results
                        },
                        "required": ["text"]
                    }
                },
                {
                    "name": "get_tickets_by_project",
                    "description": "Gets tickets for a specific Jira project, most recently updated first",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "project_key": { "type": "string", "description": "The project key (e.g., PROJ)" },
                            "max_results": max_results
                        },
                        "required": ["project_key"]
                    }
                },
                {
                    "name": "get_my_assigned_tickets",
                    "description": "Gets Jira tickets assigned to the current user",
                    "inputSchema": {
                        "type": "object",
                        "properties": { "max_results": max_results },
                        "required": []
                    }
                },
                {
                    "name": "get_recently_updated_tickets",
                    "description": "Gets Jira tickets updated in the last 7 days",
                    "inputSchema": {
                        "type": "object",
                        "properties": { "max_results": max_results },
                        "required": []
                    }
                },
                {
                    "name": "get_ticket_transitions",
                    "description": "Get available status transitions for a Jira ticket",
                    "inputSchema": {
                        "type": "object",
                        "properties": { "ticket_key": ticket_key },
                        "required": ["ticket_key"]
                    }
                },
                {
                    "name": "change_ticket_status",
                    "description": "Change the status of a Jira ticket (e.g., 'In Progress', 'Done', 'To Do')",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "ticket_key": ticket_key,
                            "status_name": { "type": "string", "description": "The target status name or transition name" }
                        },
                        "required": ["ticket_key", "status_name"]
                    }
                }
            ]
        })
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params = params.ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, "Invalid params"))?;
        let name = get_string_arg(&params, "name")?;
        let args = params.get("arguments").cloned().unwrap_or(json!({}));

        match self.call_tool(name, &args).await {
            Ok(value) => Ok(tool_result(&value)),
            Err(ToolFailure::Operation(err)) => {
                tracing::error!("Error in {}: {}", name, err);
                Ok(tool_error(&err))
            }
            Err(ToolFailure::Rpc(err)) => Err(err),
        }
    }

    async fn call_tool(&self, name: &str, args: &Value) -> Result<Value, ToolFailure> {
        let service = &self.service;

        let value = match name {
            "get_ticket" => {
                let ticket_key = get_string_arg(args, "ticket_key")?;
                let ticket = service.get_ticket(ticket_key).await?;
                to_value(TicketDetail::from(&ticket))
            }
            "search_tickets" => {
                let jql_query = get_string_arg(args, "jql_query")?;
                let max_results = max_results_arg(args)?;
                summaries(service.search_tickets(jql_query, max_results).await?)
            }
            "search_tickets_by_text" => {
                let text = get_string_arg(args, "text")?;
                let max_results = max_results_arg(args)?;
                summaries(service.search_tickets_by_text(text, max_results).await?)
            }
            "get_tickets_by_project" => {
                let project_key = get_string_arg(args, "project_key")?;
                let max_results = max_results_arg(args)?;
                summaries(service.get_tickets_by_project(project_key, max_results).await?)
            }
            "get_my_assigned_tickets" => {
                let max_results = max_results_arg(args)?;
                summaries(service.get_my_assigned_tickets(max_results).await?)
            }
            "get_recently_updated_tickets" => {
                let max_results = max_results_arg(args)?;
                summaries(service.get_recently_updated_tickets(max_results).await?)
            }
            "get_ticket_transitions" => {
                let ticket_key = get_string_arg(args, "ticket_key")?;
                let transitions = service.get_ticket_transitions(ticket_key).await?;
                json!({ "transitions": transitions })
            }
            "change_ticket_status" => {
                let ticket_key = get_string_arg(args, "ticket_key")?;
                let status_name = get_string_arg(args, "status_name")?;
                to_value(service.change_ticket_status(ticket_key, status_name).await?)
            }
            _ => {
                return Err(JsonRpcError::new(
                    METHOD_NOT_FOUND,
                    format!("Tool not found: {}", name),
                )
                .into());
            }
        };

        Ok(value)
    }
}

fn get_string_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, JsonRpcError> {
    args.get(key).and_then(|v| v.as_str()).ok_or_else(|| {
        JsonRpcError::new(
            INVALID_PARAMS,
            format!("Missing or invalid argument: {}", key),
        )
    })
}

fn max_results_arg(args: &Value) -> Result<Option<i64>, jirabridge_jira::Error> {
    limit::from_json(args.get("max_results").or_else(|| args.get("limit")))
}

fn to_value<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn summaries(tickets: Vec<Ticket>) -> Value {
    to_value(tickets.iter().map(TicketSummary::from).collect::<Vec<_>>())
}

fn tool_result(value: &Value) -> Value {
    let text = serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| "Failed to serialize result".to_string());

    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": false
    })
}

fn tool_error(err: &jirabridge_jira::Error) -> Value {
    json!({
        "content": [{ "type": "text", "text": format!("Error [{}]: {}", err.kind(), err) }],
        "isError": true
    })
}

fn parse_error_response() -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(JsonRpcError::new(PARSE_ERROR, "Parse error")),
        id: None,
    }
}

/// Parse one line of input and produce the line to write back, if any.
pub async fn handle_line(server: &McpServer, line: &str) -> Option<String> {
    let response = match serde_json::from_str::<JsonRpcRequest>(line) {
        Ok(request) => server.handle_request(request).await?,
        Err(e) => {
            tracing::error!("Failed to parse request: {}", e);
            parse_error_response()
        }
    };

    match serde_json::to_string(&response) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!("Failed to serialize response: {}", e);
            None
        }
    }
}

/// Serve MCP over stdin/stdout until stdin closes.
pub async fn run_mcp_server(service: Arc<TicketService>) -> Result<()> {
    let server = McpServer::new(service);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    tracing::info!("JiraBridge MCP server mode started. Listening on stdin.");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        tracing::debug!(%line, "Received MCP request");

        if let Some(response) = handle_line(&server, &line).await {
            tracing::debug!(%response, "Sending MCP response");
            stdout.write_all(response.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }

    tracing::info!("stdin closed, MCP server stopping");
    Ok(())
}

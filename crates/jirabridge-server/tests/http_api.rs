use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use jirabridge_core::models::{JiraConfig, LimitConfig};
use jirabridge_jira::JiraClient;
use jirabridge_server::{router, AppState, TicketService};
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

fn app_for(server: &Server) -> Router {
    let config = JiraConfig {
        base_url: server.url(),
        username: "user@example.com".to_string(),
        api_token: "token".to_string(),
        timeout_secs: 5,
    };
    let client = JiraClient::new(&config).unwrap();
    let service = TicketService::new(client, LimitConfig::default());
    router(AppState::new(Arc::new(service)))
}

fn issue(key: &str, status: &str) -> Value {
    json!({
        "id": "10001",
        "key": key,
        "self": format!("https://jira.example.com/rest/api/2/issue/{}", key),
        "fields": {
            "summary": "Fix login redirect",
            "description": "Users bounce back to /login",
            "status": { "name": status },
            "priority": { "name": "High" },
            "issuetype": { "name": "Bug" },
            "project": { "key": "PROJ", "name": "Project" },
            "assignee": { "displayName": "Ada Lovelace", "emailAddress": "ada@example.com" },
            "created": "2024-01-01T09:00:00.000+0000",
            "updated": "2024-01-02T09:00:00.000+0000"
        }
    })
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_get_ticket_detail() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/api/2/issue/PROJ-1")
        .with_status(200)
        .with_body(issue("PROJ-1", "To Do").to_string())
        .create_async()
        .await;

    let (status, body) = call(app_for(&server), get("/api/jira/ticket/PROJ-1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "PROJ-1");
    assert_eq!(body["project"], "PROJ");
    assert_eq!(body["status"], "To Do");
    assert_eq!(body["issuetype"], "Bug");
    assert_eq!(body["assignee"]["displayName"], "Ada Lovelace");
}

#[tokio::test]
async fn test_missing_ticket_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/api/2/issue/PROJ-404")
        .with_status(404)
        .with_body(r#"{"errorMessages":["Issue does not exist"]}"#)
        .create_async()
        .await;

    let (status, body) = call(app_for(&server), get("/api/jira/ticket/PROJ-404")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_bad_credentials_are_unauthorized() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/api/2/search")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let (status, body) = call(app_for(&server), get("/api/jira/tickets/assigned")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_project_listing_uses_limit() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/api/2/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "jql".into(),
                "project = \"PROJ\" ORDER BY updated DESC".into(),
            ),
            Matcher::UrlEncoded("maxResults".into(), "3".into()),
        ]))
        .with_status(200)
        .with_body(json!({ "issues": [issue("PROJ-1", "To Do")], "total": 1 }).to_string())
        .create_async()
        .await;

    let (status, body) = call(
        app_for(&server),
        get("/api/jira/tickets/project/PROJ?limit=3"),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["key"], "PROJ-1");
    assert_eq!(list[0]["assignee"], "Ada Lovelace");
}

#[tokio::test]
async fn test_transitions_listing() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/api/2/issue/PROJ-1/transitions")
        .with_status(200)
        .with_body(
            json!({
                "transitions": [
                    { "id": "11", "name": "Start Progress", "to": { "name": "In Progress" } },
                    { "id": "31", "name": "Resolve", "to": { "name": "Done" } }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let (status, body) = call(
        app_for(&server),
        get("/api/jira/ticket/PROJ-1/transitions"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let transitions = body["transitions"].as_array().unwrap();
    assert_eq!(transitions.len(), 2);
    assert_eq!(transitions[1]["id"], "31");
    assert_eq!(transitions[1]["to"]["name"], "Done");
}

#[tokio::test]
async fn test_change_status_flow() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/api/2/issue/PROJ-1/transitions")
        .with_status(200)
        .with_body(
            json!({
                "transitions": [
                    { "id": "11", "name": "Start Progress", "to": { "name": "In Progress" } }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let post = server
        .mock("POST", "/rest/api/2/issue/PROJ-1/transitions")
        .match_body(Matcher::Json(json!({ "transition": { "id": "11" } })))
        .with_status(204)
        .create_async()
        .await;
    server
        .mock("GET", "/rest/api/2/issue/PROJ-1")
        .with_status(200)
        .with_body(issue("PROJ-1", "In Progress").to_string())
        .create_async()
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/jira/ticket/PROJ-1/status")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"status":"in progress"}"#))
        .unwrap();
    let (status, body) = call(app_for(&server), request).await;

    post.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Status changed to in progress");
    assert_eq!(body["ticket"]["status"], "In Progress");
}

#[tokio::test]
async fn test_unknown_status_is_conflict() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/api/2/issue/PROJ-1/transitions")
        .with_status(200)
        .with_body(
            json!({
                "transitions": [
                    { "id": "11", "name": "Start Progress", "to": { "name": "In Progress" } }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let post = server
        .mock("POST", "/rest/api/2/issue/PROJ-1/transitions")
        .expect(0)
        .create_async()
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/jira/ticket/PROJ-1/status")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"status":"Done"}"#))
        .unwrap();
    let (status, body) = call(app_for(&server), request).await;

    post.assert_async().await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");
    assert!(body["message"].as_str().unwrap().contains("In Progress"));
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/api/2/search")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let (status, body) = call(
        app_for(&server),
        get("/api/jira/tickets/search?jql=project%20%3D%20PROJ"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_error");
}

//! Shared helpers for API integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, header},
};
use serde_json::Value;
use tower::ServiceExt;

use kex::agent::{AgentError, CodebaseQuery};
use kex::api::{self, AppState};
use kex::db::Database;
use kex::project::ProjectRepository;
use kex::session::SessionManager;

/// Stub agent returning a canned reply, or failing every call.
pub struct StubAgent {
    reply: String,
    fail: bool,
}

impl StubAgent {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: String::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl CodebaseQuery for StubAgent {
    async fn ask(&self, _prompt: &str, _repo_path: &str) -> Result<String, AgentError> {
        if self.fail {
            return Err(AgentError::Failed {
                code: Some(1),
                stderr: "stub agent failure".to_string(),
            });
        }
        Ok(self.reply.clone())
    }
}

/// Build a test application over an in-memory database and a stub agent.
pub async fn test_app_with_agent(agent: StubAgent) -> Router {
    let db = Database::in_memory().await.unwrap();
    let projects = Arc::new(ProjectRepository::new(db.pool().clone()));
    let sessions = Arc::new(SessionManager::new());
    api::create_router(AppState::new(sessions, projects, Arc::new(agent)))
}

pub async fn test_app() -> Router {
    test_app_with_agent(StubAgent::replying("stub reply")).await
}

/// Send a request with an optional JSON body and return the response.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().uri(uri).method(method);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Create a project via the API and return its ID.
pub async fn create_project(app: &Router, name: &str, repo_path: Option<&str>) -> String {
    let response = send(
        app,
        Method::POST,
        "/projects",
        Some(serde_json::json!({ "name": name, "repo_path": repo_path })),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// Create a session for a project via the API and return its ID.
pub async fn create_session(app: &Router, project_id: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/sessions",
        Some(serde_json::json!({ "project_id": project_id })),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    body_json(response).await["session_id"]
        .as_str()
        .unwrap()
        .to_string()
}

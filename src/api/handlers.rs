//! API request handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::project::{Project, ProjectUpdate};
use crate::session::{ChatMessage, SessionInfo, SessionUpdate, build_chat_prompt};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Root info response.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// Root endpoint.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Knowledge Extraction API".to_string(),
    })
}

// ==========================================================================
// Projects
// ==========================================================================

/// Request to create a project.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub repo_path: Option<String>,
}

/// Response for project listings.
#[derive(Debug, Serialize)]
pub struct ListProjectsResponse {
    pub projects: Vec<Project>,
    pub count: usize,
}

/// Response for project deletion.
#[derive(Debug, Serialize)]
pub struct DeleteProjectResponse {
    pub success: bool,
    pub project_id: String,
    pub message: String,
}

/// Create a new project.
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state
        .projects
        .create_project(&request.name, request.repo_path.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// List all projects.
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<ListProjectsResponse>> {
    let projects = state.projects.list_projects().await?;
    let count = projects.len();
    Ok(Json(ListProjectsResponse { projects, count }))
}

/// Get a project by ID.
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Project>> {
    let project = state
        .projects
        .find_project(&project_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Project {} not found", project_id)))?;
    Ok(Json(project))
}

/// Update a project's fields.
pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(update): Json<ProjectUpdate>,
) -> ApiResult<Json<Project>> {
    let project = state
        .projects
        .update_project(&project_id, update)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Project {} not found", project_id)))?;
    Ok(Json(project))
}

/// Delete a project.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<DeleteProjectResponse>> {
    if !state.projects.delete_project(&project_id).await? {
        return Err(ApiError::not_found(format!(
            "Project {} not found",
            project_id
        )));
    }
    Ok(Json(DeleteProjectResponse {
        success: true,
        project_id: project_id.clone(),
        message: format!("Project {} deleted successfully", project_id),
    }))
}

// ==========================================================================
// Sessions
// ==========================================================================

/// Request to create a session.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub project_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response from session creation.
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub created_at: String,
    pub project_id: String,
    pub name: Option<String>,
}

/// Full session details, including the transcript.
#[derive(Debug, Serialize)]
pub struct SessionDetail {
    pub session_id: String,
    pub created_at: String,
    pub last_accessed: String,
    pub project_id: String,
    pub message_count: usize,
    pub message_history: Vec<ChatMessage>,
    pub name: Option<String>,
}

/// Optional filter for session listings.
#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    pub project_id: Option<String>,
}

/// Response for session listings.
#[derive(Debug, Serialize)]
pub struct ListSessionsResponse {
    pub sessions: Vec<SessionInfo>,
    pub count: usize,
}

/// Response from a session update.
#[derive(Debug, Serialize)]
pub struct UpdateSessionResponse {
    pub session_id: String,
    pub name: Option<String>,
    pub message: String,
}

/// Response from a session deletion.
#[derive(Debug, Serialize)]
pub struct DeleteSessionResponse {
    pub success: bool,
    pub session_id: String,
    pub message: String,
}

/// Request to send a chat message.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Response from a chat exchange.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub response: String,
    pub message_count: usize,
}

fn session_not_found(session_id: &str) -> ApiError {
    ApiError::not_found(format!("Session {} not found", session_id))
}

/// Create a new session for a project.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<CreateSessionResponse>)> {
    let session = state
        .sessions
        .create_session(&request.project_id, state.projects.as_ref(), request.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.session_id,
            created_at: session.created_at.to_rfc3339(),
            project_id: session.project_id,
            name: session.name,
        }),
    ))
}

/// List sessions, optionally filtered by project.
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<ListSessionsQuery>,
) -> Json<ListSessionsResponse> {
    let sessions = state.sessions.list_sessions(query.project_id.as_deref());
    let count = sessions.len();
    Json(ListSessionsResponse { sessions, count })
}

/// Get session details including the full message history.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionDetail>> {
    let session = state
        .sessions
        .get_session(&session_id)
        .ok_or_else(|| session_not_found(&session_id))?;

    Ok(Json(SessionDetail {
        session_id: session.session_id,
        created_at: session.created_at.to_rfc3339(),
        last_accessed: session.last_accessed.to_rfc3339(),
        project_id: session.project_id,
        message_count: session.message_history.len(),
        message_history: session.message_history,
        name: session.name,
    }))
}

/// Update a session's properties.
pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(update): Json<SessionUpdate>,
) -> ApiResult<Json<UpdateSessionResponse>> {
    let session = state
        .sessions
        .update_session(&session_id, update)
        .ok_or_else(|| session_not_found(&session_id))?;

    Ok(Json(UpdateSessionResponse {
        session_id: session.session_id,
        name: session.name,
        message: format!("Session {} updated successfully", session_id),
    }))
}

/// Delete a session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<DeleteSessionResponse>> {
    if !state.sessions.delete_session(&session_id) {
        return Err(session_not_found(&session_id));
    }
    Ok(Json(DeleteSessionResponse {
        success: true,
        session_id: session_id.clone(),
        message: format!("Session {} deleted successfully", session_id),
    }))
}

/// Send a message to a session and get the agent's response.
///
/// The transcript is only extended after the agent call succeeds; a failed
/// call propagates without touching session state.
pub async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let session = state
        .sessions
        .get_session(&session_id)
        .ok_or_else(|| session_not_found(&session_id))?;

    let prompt = build_chat_prompt(&session.message_history, &request.message);
    let response = state.agent.ask(&prompt, &session.repo_path).await?;

    // The session may have been reaped while the agent was running.
    let message_count = state
        .sessions
        .append_exchange(&session_id, &request.message, &response)
        .ok_or_else(|| session_not_found(&session_id))?;

    info!(
        "Chat completed for session {}. Message count: {}",
        session_id, message_count
    );

    Ok(Json(ChatResponse {
        session_id,
        response,
        message_count,
    }))
}

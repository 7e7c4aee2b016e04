//! HTTP request handlers.

use crate::board::{
    BoardError, BoardService, Epic, EpicPatch, NewEpic, NewProject, NewTask, Project, ProjectPatch,
    Task, TaskPatch,
};
use crate::events::EventBus;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Shared server state.
pub struct ServerState {
    pub board: BoardService,
    pub event_bus: Arc<EventBus>,
}

pub type AppState = Arc<ServerState>;

// ============================================================================
// Health check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Projects
// ============================================================================

pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(state.board.list_projects().await?))
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(new): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let project = state.board.create_project(new).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(state.board.get_project(id).await?))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(state.board.update_project(id, patch).await?))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.board.delete_project(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Epics
// ============================================================================

pub async fn list_epics(State(state): State<AppState>) -> Result<Json<Vec<Epic>>, AppError> {
    Ok(Json(state.board.list_epics().await?))
}

pub async fn create_epic(
    State(state): State<AppState>,
    Json(new): Json<NewEpic>,
) -> Result<(StatusCode, Json<Epic>), AppError> {
    let epic = state.board.create_epic(new).await?;
    Ok((StatusCode::CREATED, Json(epic)))
}

pub async fn get_epic(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Epic>, AppError> {
    Ok(Json(state.board.get_epic(id).await?))
}

pub async fn update_epic(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<EpicPatch>,
) -> Result<Json<Epic>, AppError> {
    Ok(Json(state.board.update_epic(id, patch).await?))
}

pub async fn delete_epic(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.board.delete_epic(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Tasks of one epic, sorted by order ascending.
pub async fn list_epic_tasks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Task>>, AppError> {
    Ok(Json(state.board.tasks_for_epic(id).await?))
}

// ============================================================================
// Tasks
// ============================================================================

pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, AppError> {
    Ok(Json(state.board.list_tasks().await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(new): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let task = state.board.create_task(new).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(state.board.get_task(id).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(state.board.update_task(id, patch).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.board.delete_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Bulk ingestion
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    pub bulk_text: String,
}

#[derive(Debug, Serialize)]
pub struct BulkCreateResponse {
    pub count: u64,
}

pub async fn create_tasks_bulk(
    State(state): State<AppState>,
    Path(epic_id): Path<Uuid>,
    Json(req): Json<BulkCreateRequest>,
) -> Result<(StatusCode, Json<BulkCreateResponse>), AppError> {
    let count = state
        .board
        .create_tasks_from_text(epic_id, &req.bulk_text)
        .await?;
    Ok((StatusCode::CREATED, Json(BulkCreateResponse { count })))
}

// ============================================================================
// Error handling
// ============================================================================

/// HTTP-boundary error type.
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    NotFound(String),
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(e) => {
                // Logged server-side; the client gets a generic message.
                error!("internal error: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<BoardError> for AppError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::Validation(msg) => AppError::BadRequest(msg),
            BoardError::NotFound(msg) => AppError::NotFound(msg),
            BoardError::NoValidEntries => AppError::BadRequest(err.to_string()),
            BoardError::Internal(e) => AppError::Internal(e),
        }
    }
}

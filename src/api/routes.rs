//! API route definitions.

use super::handlers::{self, AppState};
use super::ws;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Projects
        .route(
            "/api/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        // Epics
        .route(
            "/api/epics",
            get(handlers::list_epics).post(handlers::create_epic),
        )
        .route(
            "/api/epics/{id}",
            get(handlers::get_epic)
                .put(handlers::update_epic)
                .delete(handlers::delete_epic),
        )
        .route("/api/epics/{id}/tasks", get(handlers::list_epic_tasks))
        // Tasks
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        // Bulk ingestion (creates tasks, so it lives under /tasks)
        .route(
            "/api/tasks/bulk/epic/{epic_id}",
            post(handlers::create_tasks_bulk),
        )
        // Real-time change notifications
        .route("/ws/events", get(ws::ws_events))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

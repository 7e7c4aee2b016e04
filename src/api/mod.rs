//! HTTP API: routes, handlers, and WebSocket event fan-out.

pub mod handlers;
pub mod routes;
pub mod ws;

pub use handlers::{AppError, AppState, ServerState};
pub use routes::create_router;

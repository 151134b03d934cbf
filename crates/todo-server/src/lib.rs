//! HTTP surface of the todo service.

pub mod api;
pub mod api_todos;
pub mod api_users;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use todo_db::DbPool;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool. The only path to storage.
    pub pool: DbPool,
}

/// Maximum request body size (1 MiB).
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/todos",
            get(api_todos::list_todos_handler).post(api_todos::create_todo_handler),
        )
        .route(
            "/api/todos/{id}",
            put(api_todos::update_todo_handler)
                .patch(api_todos::toggle_todo_handler)
                .delete(api_todos::delete_todo_handler),
        )
        .route(
            "/api/users",
            get(api_users::list_users_handler).post(api_users::create_user_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}

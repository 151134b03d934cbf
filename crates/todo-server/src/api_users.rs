//! Handlers for `/api/users`.

use crate::api::{json_body, non_empty, with_conn, ApiError};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use todo_store::User;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// GET /api/users
pub async fn list_users_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<User>>, ApiError> {
    const CONTEXT: &str = "failed to list users";

    let users = with_conn(&state, CONTEXT, |conn| {
        todo_store::list_users(conn).map_err(|e| ApiError::internal(CONTEXT, e))
    })
    .await?;

    Ok(Json(users))
}

/// POST /api/users
///
/// A taken email is detected by reading it back first, not by the UNIQUE
/// constraint.
pub async fn create_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    const CONTEXT: &str = "failed to create user";

    let payload = json_body(payload)?;
    let (name, email) = match (non_empty(payload.name), non_empty(payload.email)) {
        (Some(name), Some(email)) => (name, email),
        _ => {
            return Err(ApiError::BadRequest(
                "name and email are required".to_string(),
            ))
        }
    };

    let user = with_conn(&state, CONTEXT, move |conn| {
        let existing = todo_store::get_user_by_email(conn, &email)
            .map_err(|e| ApiError::internal(CONTEXT, e))?;
        if existing.is_some() {
            return Err(ApiError::Conflict("email already exists".to_string()));
        }

        let id = todo_store::insert_user(conn, &name, &email)
            .map_err(|e| ApiError::internal(CONTEXT, e))?;
        todo_store::get_user(conn, id)
            .map_err(|e| ApiError::internal(CONTEXT, e))?
            .ok_or_else(|| ApiError::internal(CONTEXT, format!("user {id} missing after insert")))
    })
    .await?;

    tracing::debug!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

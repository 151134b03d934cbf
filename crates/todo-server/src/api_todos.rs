//! Handlers for `/api/todos`.

use crate::api::{json_body, lenient_id, non_empty, truthy, with_conn, ApiError};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Path, Query},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use todo_store::{NewTodo, Todo, TodoUpdate, TodoWithOwner};

const TODO_NOT_FOUND: &str = "todo not found";

#[derive(Debug, Deserialize)]
pub struct ListTodosParams {
    /// Restrict the listing to one owner.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Integer or numeric string.
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Any JSON value; read by truthiness.
    #[serde(default, deserialize_with = "truthy")]
    pub completed: Option<bool>,
}

/// Owner filter derived from the `userId` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OwnerFilter {
    All,
    User(i64),
    /// A value that cannot name any user.
    Unmatchable,
}

impl OwnerFilter {
    fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::All,
            Some(value) => value.parse().map(Self::User).unwrap_or(Self::Unmatchable),
        }
    }
}

/// Path ids that are not integers cannot match a row.
fn parse_todo_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(TODO_NOT_FOUND.to_string()))
}

/// GET /api/todos
pub async fn list_todos_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ListTodosParams>,
) -> Result<Json<Vec<TodoWithOwner>>, ApiError> {
    const CONTEXT: &str = "failed to list todos";

    let todos = match OwnerFilter::from_param(params.user_id.as_deref()) {
        OwnerFilter::All => {
            with_conn(&state, CONTEXT, |conn| {
                todo_store::list_todos(conn).map_err(|e| ApiError::internal(CONTEXT, e))
            })
            .await?
        }
        OwnerFilter::User(user_id) => {
            with_conn(&state, CONTEXT, move |conn| {
                todo_store::list_todos_by_user(conn, user_id)
                    .map_err(|e| ApiError::internal(CONTEXT, e))
            })
            .await?
        }
        OwnerFilter::Unmatchable => Vec::new(),
    };

    Ok(Json(todos))
}

/// POST /api/todos
///
/// New todos always start incomplete. The owner is not looked up; a dangling
/// `user_id` is left to the store's foreign key.
pub async fn create_todo_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    const CONTEXT: &str = "failed to create todo";

    let payload = json_body(payload)?;
    let (title, user_id) = match (non_empty(payload.title), payload.user_id) {
        (Some(title), Some(user_id)) if user_id != 0 => (title, user_id),
        _ => {
            return Err(ApiError::BadRequest(
                "title and user_id are required".to_string(),
            ))
        }
    };

    let new = NewTodo {
        title,
        description: payload.description.unwrap_or_default(),
        user_id,
        completed: false,
    };

    let todo = with_conn(&state, CONTEXT, move |conn| {
        let id = todo_store::insert_todo(conn, &new)
            .map_err(|e| ApiError::internal(CONTEXT, e))?;
        todo_store::get_todo(conn, id)
            .map_err(|e| ApiError::internal(CONTEXT, e))?
            .ok_or_else(|| ApiError::internal(CONTEXT, format!("todo {id} missing after insert")))
    })
    .await?;

    tracing::debug!(todo_id = todo.id, user_id = todo.user_id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// PUT /api/todos/:id
///
/// Overwrites title, description and completion unconditionally, then reads
/// the row back; a missing row only shows up as a 404 at that point.
pub async fn update_todo_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    const CONTEXT: &str = "failed to update todo";

    let payload = json_body(payload)?;
    let title = non_empty(payload.title)
        .ok_or_else(|| ApiError::BadRequest("title is required".to_string()))?;
    let id = parse_todo_id(&raw_id)?;

    let update = TodoUpdate {
        title,
        description: payload.description.unwrap_or_default(),
        completed: payload.completed.unwrap_or(false),
    };

    let todo = with_conn(&state, CONTEXT, move |conn| {
        todo_store::update_todo(conn, id, &update)
            .map_err(|e| ApiError::internal(CONTEXT, e))?;
        todo_store::get_todo(conn, id).map_err(|e| ApiError::internal(CONTEXT, e))
    })
    .await?
    .ok_or_else(|| ApiError::NotFound(TODO_NOT_FOUND.to_string()))?;

    Ok(Json(todo))
}

/// PATCH /api/todos/:id
pub async fn toggle_todo_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    const CONTEXT: &str = "failed to toggle todo";

    let id = parse_todo_id(&raw_id)?;

    let todo = with_conn(&state, CONTEXT, move |conn| {
        todo_store::toggle_todo(conn, id).map_err(|e| ApiError::internal(CONTEXT, e))?;
        todo_store::get_todo(conn, id).map_err(|e| ApiError::internal(CONTEXT, e))
    })
    .await?
    .ok_or_else(|| ApiError::NotFound(TODO_NOT_FOUND.to_string()))?;

    Ok(Json(todo))
}

/// DELETE /api/todos/:id
pub async fn delete_todo_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    const CONTEXT: &str = "failed to delete todo";

    let id = parse_todo_id(&raw_id)?;

    let deleted = with_conn(&state, CONTEXT, move |conn| {
        todo_store::delete_todo(conn, id).map_err(|e| ApiError::internal(CONTEXT, e))
    })
    .await?;

    if deleted == 0 {
        return Err(ApiError::NotFound(TODO_NOT_FOUND.to_string()));
    }

    Ok(Json(json!({ "success": true })))
}

//! Shared plumbing for the API handlers: the error envelope, JSON body
//! validation, and blocking database access.

use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use std::fmt::Display;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// A unique key is already taken. Clients see this as a 400.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Carries only the public message; the cause is logged where it occurs.
    #[error("internal server error: {0}")]
    InternalServerError(&'static str),
}

impl ApiError {
    /// Logs `err` and returns a 500 whose body says only `context`.
    pub fn internal(context: &'static str, err: impl Display) -> Self {
        tracing::error!(error = %err, "{}", context);
        Self::InternalServerError(context)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalServerError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string())
            }
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Unwraps a JSON body. Anything the extractor rejects becomes a 400 with a
/// fixed message; the extractor's detail is only logged.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected request body");
            Err(ApiError::BadRequest("invalid request body".to_string()))
        }
    }
}

/// Reads a flag the way form-driven clients send it: `true`/`false`, `1`/`0`,
/// a non-empty string, or `null`. Zero, empty and `null` are false.
pub(crate) fn truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }))
}

/// Reads an id sent either as a JSON integer or as a numeric string.
/// `null` and `""` read as absent.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("id {n} is not an integer"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("id {s:?} is not an integer"))),
        Some(other) => Err(de::Error::custom(format!("id {other} is not an integer"))),
    }
}

/// Treats `None` and the empty string alike, as JSON clients send both for
/// "not filled in".
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Runs `f` with a pooled connection on the blocking thread pool.
///
/// Pool and task failures become a 500 carrying `context`.
pub(crate) async fn with_conn<T, F>(
    state: &AppState,
    context: &'static str,
    f: F,
) -> Result<T, ApiError>
where
    F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let pool = state.pool.clone();
    tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|e| ApiError::internal(context, e))?;
        f(&conn)
    })
    .await
    .map_err(|e| ApiError::internal(context, e))?
}

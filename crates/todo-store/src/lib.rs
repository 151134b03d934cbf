//! Data-access layer for users and todo items.
//!
//! Every query the service runs is declared here as a [`Query`]: a named,
//! parameterized SQL constant. Queries execute through the connection's
//! prepared-statement cache, so each one is compiled once per pooled
//! connection and then reused with fresh bound arguments. No SQL is ever
//! assembled from request data.
//!
//! [`open_store`] is the entry point: it opens the pool so that every
//! connection creates the schema if missing and compiles the whole catalogue
//! before it serves its first query.
//!
//! Foreign-key existence is not checked here. A todo pointing at a missing
//! user is rejected (or not) by SQLite itself, depending on whether the
//! connection has `foreign_keys` enabled.

mod seed;
mod todos;
mod users;

pub use seed::{seed_sample_data, SeedOutcome};
pub use todos::{
    delete_todo, get_todo, insert_todo, list_todos, list_todos_by_user, toggle_todo,
    update_todo, NewTodo, Todo, TodoUpdate, TodoWithOwner,
};
pub use users::{
    count_users, delete_user, get_user, get_user_by_email, insert_user, list_users,
    update_user, User,
};

use rusqlite::Connection;
use thiserror::Error;
use todo_db::{DbPool, PoolError, PoolSettings, SchemaError};

/// Errors that can occur during data-access operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("statement '{name}' failed to prepare: {source}")]
    Prepare {
        name: &'static str,
        source: rusqlite::Error,
    },
}

/// A named, parameterized SQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    /// Stable identifier used in logs and errors.
    pub name: &'static str,
    /// SQL text with positional `?N` placeholders.
    pub sql: &'static str,
}

/// Every statement in the catalogue, users first.
pub fn all_queries() -> impl Iterator<Item = &'static Query> {
    users::QUERIES.iter().chain(todos::QUERIES.iter())
}

/// Compiles the whole statement catalogue into the connection's cache.
///
/// Needs the schema in place. A statement that no longer matches the schema
/// fails here instead of on the first request.
///
/// Returns the number of statements prepared.
pub fn prepare_statements(conn: &Connection) -> Result<usize, StoreError> {
    let mut prepared = 0;
    for query in all_queries() {
        conn.prepare_cached(query.sql)
            .map_err(|source| StoreError::Prepare {
                name: query.name,
                source,
            })?;
        prepared += 1;
    }
    tracing::debug!(count = prepared, "prepared statement catalogue");
    Ok(prepared)
}

/// Opens the store with every pooled connection schema-ready and warmed.
///
/// # Errors
///
/// Returns `PoolError` if the file cannot be opened or a connection fails
/// its setup (the cause is logged).
pub fn open_store(db_path: &str, settings: PoolSettings) -> Result<DbPool, PoolError> {
    todo_db::create_pool(db_path, settings, prepare_connection)
}

fn prepare_connection(conn: &Connection) -> rusqlite::Result<()> {
    todo_db::init_schema(conn).map_err(|SchemaError::ExecutionFailed(e)| e)?;
    match prepare_statements(conn) {
        Ok(_) => Ok(()),
        Err(StoreError::Prepare { name, source }) => {
            tracing::error!(
                statement = name,
                error = %source,
                "statement does not match schema"
            );
            Err(source)
        }
        Err(StoreError::Database(e)) => Err(e),
    }
}

//! User queries.

use crate::{Query, StoreError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Generated row ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Creation timestamp (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub created_at: String,
}

const LIST: Query = Query {
    name: "users.list",
    sql: "SELECT id, name, email, created_at FROM users
          ORDER BY created_at DESC, id DESC",
};

const GET_BY_ID: Query = Query {
    name: "users.get_by_id",
    sql: "SELECT id, name, email, created_at FROM users WHERE id = ?1",
};

const GET_BY_EMAIL: Query = Query {
    name: "users.get_by_email",
    sql: "SELECT id, name, email, created_at FROM users WHERE email = ?1",
};

const INSERT: Query = Query {
    name: "users.insert",
    sql: "INSERT INTO users (name, email) VALUES (?1, ?2)",
};

const UPDATE: Query = Query {
    name: "users.update",
    sql: "UPDATE users SET name = ?1, email = ?2 WHERE id = ?3",
};

const DELETE: Query = Query {
    name: "users.delete",
    sql: "DELETE FROM users WHERE id = ?1",
};

const COUNT: Query = Query {
    name: "users.count",
    sql: "SELECT COUNT(*) FROM users",
};

pub(crate) const QUERIES: &[Query] = &[
    LIST,
    GET_BY_ID,
    GET_BY_EMAIL,
    INSERT,
    UPDATE,
    DELETE,
    COUNT,
];

/// Lists all users, newest first.
pub fn list_users(conn: &Connection) -> Result<Vec<User>, StoreError> {
    let mut stmt = conn.prepare_cached(LIST.sql)?;
    let rows = stmt.query_map([], map_row_to_user)?;
    let mut users = Vec::new();
    for row in rows {
        users.push(row?);
    }
    Ok(users)
}

/// Retrieves a user by ID.
pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>, StoreError> {
    let mut stmt = conn.prepare_cached(GET_BY_ID.sql)?;
    Ok(stmt.query_row([id], map_row_to_user).optional()?)
}

/// Retrieves a user by email address.
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, StoreError> {
    let mut stmt = conn.prepare_cached(GET_BY_EMAIL.sql)?;
    Ok(stmt.query_row([email], map_row_to_user).optional()?)
}

/// Inserts a user and returns its generated ID.
///
/// A duplicate email surfaces as a constraint violation from SQLite; callers
/// that want a friendly error check [`get_user_by_email`] first.
pub fn insert_user(conn: &Connection, name: &str, email: &str) -> Result<i64, StoreError> {
    let mut stmt = conn.prepare_cached(INSERT.sql)?;
    Ok(stmt.insert(params![name, email])?)
}

/// Overwrites a user's name and email. Returns the number of rows changed.
pub fn update_user(
    conn: &Connection,
    id: i64,
    name: &str,
    email: &str,
) -> Result<usize, StoreError> {
    let mut stmt = conn.prepare_cached(UPDATE.sql)?;
    Ok(stmt.execute(params![name, email, id])?)
}

/// Deletes a user. Their todos go with them through the foreign-key cascade.
///
/// Returns the number of user rows deleted.
pub fn delete_user(conn: &Connection, id: i64) -> Result<usize, StoreError> {
    let mut stmt = conn.prepare_cached(DELETE.sql)?;
    Ok(stmt.execute([id])?)
}

/// Counts all users.
pub fn count_users(conn: &Connection) -> Result<i64, StoreError> {
    let mut stmt = conn.prepare_cached(COUNT.sql)?;
    Ok(stmt.query_row([], |row| row.get(0))?)
}

fn map_row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
    })
}

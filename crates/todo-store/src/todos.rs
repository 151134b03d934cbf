//! Todo queries.

use crate::{Query, StoreError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// A todo item as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    /// Generated row ID.
    pub id: i64,
    pub title: String,
    /// Free-form details; empty when not supplied.
    pub description: String,
    pub completed: bool,
    /// Owning user.
    pub user_id: i64,
    /// Creation timestamp (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub created_at: String,
}

/// A todo joined with its owner's name and email, as returned by listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoWithOwner {
    #[serde(flatten)]
    pub todo: Todo,
    pub user_name: String,
    pub user_email: String,
}

/// Parameters for inserting a todo.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub user_id: i64,
    pub completed: bool,
}

/// Full replacement of a todo's editable fields.
#[derive(Debug, Clone)]
pub struct TodoUpdate {
    pub title: String,
    pub description: String,
    pub completed: bool,
}

const LIST: Query = Query {
    name: "todos.list",
    sql: "SELECT t.id, t.title, t.description, t.completed, t.user_id, t.created_at,
                 u.name, u.email
          FROM todos t
          JOIN users u ON t.user_id = u.id
          ORDER BY t.created_at DESC, t.id DESC",
};

const LIST_BY_USER: Query = Query {
    name: "todos.list_by_user",
    sql: "SELECT t.id, t.title, t.description, t.completed, t.user_id, t.created_at,
                 u.name, u.email
          FROM todos t
          JOIN users u ON t.user_id = u.id
          WHERE t.user_id = ?1
          ORDER BY t.created_at DESC, t.id DESC",
};

const GET_BY_ID: Query = Query {
    name: "todos.get_by_id",
    sql: "SELECT id, title, description, completed, user_id, created_at
          FROM todos WHERE id = ?1",
};

const INSERT: Query = Query {
    name: "todos.insert",
    sql: "INSERT INTO todos (title, description, user_id, completed) VALUES (?1, ?2, ?3, ?4)",
};

const UPDATE: Query = Query {
    name: "todos.update",
    sql: "UPDATE todos SET title = ?1, description = ?2, completed = ?3 WHERE id = ?4",
};

const TOGGLE: Query = Query {
    name: "todos.toggle_completed",
    sql: "UPDATE todos SET completed = NOT completed WHERE id = ?1",
};

const DELETE: Query = Query {
    name: "todos.delete",
    sql: "DELETE FROM todos WHERE id = ?1",
};

pub(crate) const QUERIES: &[Query] = &[
    LIST,
    LIST_BY_USER,
    GET_BY_ID,
    INSERT,
    UPDATE,
    TOGGLE,
    DELETE,
];

/// Lists every todo with its owner, newest first.
pub fn list_todos(conn: &Connection) -> Result<Vec<TodoWithOwner>, StoreError> {
    let mut stmt = conn.prepare_cached(LIST.sql)?;
    let rows = stmt.query_map([], map_row_to_todo_with_owner)?;
    let mut todos = Vec::new();
    for row in rows {
        todos.push(row?);
    }
    Ok(todos)
}

/// Lists the todos owned by `user_id`, newest first.
pub fn list_todos_by_user(
    conn: &Connection,
    user_id: i64,
) -> Result<Vec<TodoWithOwner>, StoreError> {
    let mut stmt = conn.prepare_cached(LIST_BY_USER.sql)?;
    let rows = stmt.query_map([user_id], map_row_to_todo_with_owner)?;
    let mut todos = Vec::new();
    for row in rows {
        todos.push(row?);
    }
    Ok(todos)
}

/// Retrieves a todo by ID.
pub fn get_todo(conn: &Connection, id: i64) -> Result<Option<Todo>, StoreError> {
    let mut stmt = conn.prepare_cached(GET_BY_ID.sql)?;
    Ok(stmt.query_row([id], map_row_to_todo).optional()?)
}

/// Inserts a todo and returns its generated ID.
///
/// The owner is not looked up first.
pub fn insert_todo(conn: &Connection, new: &NewTodo) -> Result<i64, StoreError> {
    let mut stmt = conn.prepare_cached(INSERT.sql)?;
    Ok(stmt.insert(params![
        new.title,
        new.description,
        new.user_id,
        new.completed
    ])?)
}

/// Overwrites title, description and completion. Returns rows changed.
pub fn update_todo(conn: &Connection, id: i64, update: &TodoUpdate) -> Result<usize, StoreError> {
    let mut stmt = conn.prepare_cached(UPDATE.sql)?;
    Ok(stmt.execute(params![
        update.title,
        update.description,
        update.completed,
        id
    ])?)
}

/// Flips `completed` in place. Returns rows changed.
pub fn toggle_todo(conn: &Connection, id: i64) -> Result<usize, StoreError> {
    let mut stmt = conn.prepare_cached(TOGGLE.sql)?;
    Ok(stmt.execute([id])?)
}

/// Deletes a todo. Returns rows deleted.
pub fn delete_todo(conn: &Connection, id: i64) -> Result<usize, StoreError> {
    let mut stmt = conn.prepare_cached(DELETE.sql)?;
    Ok(stmt.execute([id])?)
}

fn map_row_to_todo(row: &Row) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
        user_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_row_to_todo_with_owner(row: &Row) -> rusqlite::Result<TodoWithOwner> {
    Ok(TodoWithOwner {
        todo: map_row_to_todo(row)?,
        user_name: row.get(6)?,
        user_email: row.get(7)?,
    })
}

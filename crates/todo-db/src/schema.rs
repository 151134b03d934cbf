//! Idempotent schema creation.
//!
//! The `users` and `todos` tables are created with `IF NOT EXISTS` inside a
//! single write transaction. Every pooled connection runs this when it opens,
//! so it must stay a no-op against an existing store.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use thiserror::Error;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    completed BOOLEAN NOT NULL DEFAULT FALSE,
    user_id INTEGER NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_todos_user_id ON todos (user_id);
";

/// Errors that can occur while creating the schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A schema statement failed.
    #[error("schema initialization failed: {0}")]
    ExecutionFailed(#[from] rusqlite::Error),
}

/// Ensures the `users` and `todos` tables exist.
///
/// Safe to call on every connection; existing tables and their rows are left
/// untouched.
///
/// # Errors
///
/// Returns `SchemaError` if any statement fails. Nothing is applied in that
/// case.
pub fn init_schema(conn: &Connection) -> Result<(), SchemaError> {
    // Take the write lock up front so connections opening together queue on
    // the busy timeout instead of failing a deferred lock upgrade.
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.commit()?;

    tracing::debug!("schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .expect("should prepare table query");
        stmt.query_map([], |row| row.get(0))
            .expect("should query tables")
            .map(|r| r.expect("should read table name"))
            .collect()
    }

    #[test]
    fn creates_both_tables() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        init_schema(&conn).expect("schema should apply");

        assert_eq!(table_names(&conn), vec!["todos", "users"]);
    }

    #[test]
    fn init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        init_schema(&conn).expect("first run should succeed");

        conn.execute(
            "INSERT INTO users (name, email) VALUES ('A', 'a@x.com')",
            [],
        )
        .expect("should insert user");

        init_schema(&conn).expect("second run should succeed");

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .expect("should count users");
        assert_eq!(count, 1, "existing rows must survive a re-run");
    }

    #[test]
    fn todo_defaults_apply() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        init_schema(&conn).expect("schema should apply");
        conn.execute(
            "INSERT INTO users (name, email) VALUES ('A', 'a@x.com')",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO todos (title, user_id) VALUES ('T', 1)", [])
            .unwrap();

        let (description, completed, created_at): (String, bool, Option<String>) = conn
            .query_row(
                "SELECT description, completed, created_at FROM todos WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(description, "");
        assert!(!completed);
        assert!(created_at.is_some(), "created_at should default to now");
    }

    #[test]
    fn todo_foreign_key_cascades() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        init_schema(&conn).expect("schema should apply");

        let (table, on_delete): (String, String) = conn
            .query_row(
                "SELECT \"table\", on_delete FROM pragma_foreign_key_list('todos')",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("todos should declare a foreign key");
        assert_eq!(table, "users");
        assert_eq!(on_delete, "CASCADE");
    }
}

//! Sample data for local development.

use crate::{count_users, insert_todo, insert_user, NewTodo, StoreError};
use rusqlite::Connection;

const SAMPLE_USERS: &[(&str, &str)] = &[
    ("Hong Gildong", "hong@example.com"),
    ("Kim Cheolsu", "kim@example.com"),
];

/// (owner index into `SAMPLE_USERS`, title, description, completed)
const SAMPLE_TODOS: &[(usize, &str, &str, bool)] = &[
    (0, "Read the axum guide", "Work through routing and extractors", false),
    (0, "Wire up SQLite", "Pool connections with r2d2", true),
    (1, "Try the todo API", "Create, toggle and delete a few items", false),
];

/// Result of a seeding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store was empty and sample rows were written.
    Seeded { users: usize, todos: usize },
    /// The store already had users; nothing was written.
    Skipped { existing_users: i64 },
}

/// Populates an empty store with sample users and todos.
///
/// Does nothing when any user already exists. All rows are written in one
/// transaction.
pub fn seed_sample_data(conn: &Connection) -> Result<SeedOutcome, StoreError> {
    let existing_users = count_users(conn)?;
    if existing_users > 0 {
        return Ok(SeedOutcome::Skipped { existing_users });
    }

    let tx = conn.unchecked_transaction()?;

    let mut user_ids = Vec::with_capacity(SAMPLE_USERS.len());
    for (name, email) in SAMPLE_USERS {
        user_ids.push(insert_user(&tx, name, email)?);
    }

    for (owner, title, description, completed) in SAMPLE_TODOS {
        insert_todo(
            &tx,
            &NewTodo {
                title: (*title).to_string(),
                description: (*description).to_string(),
                user_id: user_ids[*owner],
                completed: *completed,
            },
        )?;
    }

    tx.commit()?;

    Ok(SeedOutcome::Seeded {
        users: SAMPLE_USERS.len(),
        todos: SAMPLE_TODOS.len(),
    })
}

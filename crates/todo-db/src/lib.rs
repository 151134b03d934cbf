//! Storage layer for the todo service.
//!
//! Provides the SQLite connection pool (via `r2d2`), per-connection WAL and
//! foreign-key setup with a caller hook, and idempotent creation of the
//! `users` and `todos` tables.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: a single store file, concurrent readers while
//!   one writer commits. Correctness under concurrent requests relies on
//!   SQLite's own locking; nothing in-process coordinates writers.
//! - **Foreign keys on every connection**: SQLite leaves them off by default,
//!   and the cascade from `users` to `todos` only fires when they are on.
//! - **`CREATE TABLE IF NOT EXISTS`**: the schema is small and fixed, so it
//!   is applied by every new connection instead of through versioned
//!   migrations.

mod pool;
mod schema;

pub use pool::{create_pool, DbPool, PoolSettings, PoolError};
pub use schema::{init_schema, SchemaError};

//! The pooled store handle.
//!
//! Each connection the pool opens is brought to the same state before it is
//! handed out: WAL journal, foreign keys on, busy timeout set, a statement
//! cache large enough for the whole query catalogue, and finally whatever
//! the caller's `on_connect` hook adds (schema, warmed statements).

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

/// Statements kept compiled per connection.
const STATEMENT_CACHE_CAPACITY: usize = 32;

/// Connection tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// How long a connection waits on a locked store, in milliseconds.
    pub busy_timeout_ms: u64,
    /// Upper bound on open connections.
    pub max_connections: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            max_connections: 8,
        }
    }
}

/// The process-wide handle to the store.
pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Debug, Error)]
pub enum PoolError {
    /// No usable connection could be opened, or `on_connect` failed.
    #[error("failed to open store: {0}")]
    Open(#[from] r2d2::Error),
}

/// Opens (creating if needed) the store at `db_path`.
///
/// `on_connect` runs once on every new connection after the pragmas are
/// applied; an error there makes the connection unusable and is reported by
/// the pool. `:memory:` gives each connection its own private store.
pub fn create_pool<F>(
    db_path: &str,
    settings: PoolSettings,
    on_connect: F,
) -> Result<DbPool, PoolError>
where
    F: Fn(&Connection) -> rusqlite::Result<()> + Send + Sync + 'static,
{
    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .with_init(move |conn| {
            apply_pragmas(conn, settings)?;
            on_connect(conn)
        });

    let pool = Pool::builder()
        .max_size(settings.max_connections)
        .build(manager)?;

    tracing::debug!(
        path = db_path,
        max_connections = settings.max_connections,
        "store opened"
    );
    Ok(pool)
}

fn apply_pragmas(conn: &Connection, settings: PoolSettings) -> rusqlite::Result<()> {
    // Busy timeout first: the hook may write while sibling connections open.
    conn.busy_timeout(std::time::Duration::from_millis(settings.busy_timeout_ms))?;

    let mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    if mode != "wal" && mode != "memory" {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!("store refused WAL journal mode ({mode})")),
        ));
    }

    conn.pragma_update(None, "foreign_keys", true)?;
    conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
    Ok(())
}

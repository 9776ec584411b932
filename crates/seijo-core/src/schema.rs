use crate::error::Result;

// ---------------------------------------------------------------------------
// DDL
// ---------------------------------------------------------------------------

/// Key-value table backing [`crate::store::SqliteStore`].
///
/// Uses `CREATE TABLE IF NOT EXISTS` so that `run_migrations` is idempotent.
pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key         TEXT    NOT NULL PRIMARY KEY,
    value       TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL
);
";

// ---------------------------------------------------------------------------
// Migration runner
// ---------------------------------------------------------------------------

/// Initialise the database schema. Safe to call repeatedly.
///
/// Connection pragmas are set by the pool in [`crate::store`].
pub fn run_migrations(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLES)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

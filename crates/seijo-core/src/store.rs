//! Key-value persistence boundary.
//!
//! The bank lives as one JSON text under a single key. [`Store`] is the only
//! capability the rest of the workspace needs, so hosts can plug in their
//! own backend; [`SqliteStore`] and [`MemoryStore`] cover the common cases.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

use crate::error::{Result, SeijoError};
use crate::schema::run_migrations;

// ---------------------------------------------------------------------------
// Pool type alias
// ---------------------------------------------------------------------------

pub type DbPool = Pool<SqliteConnectionManager>;

// ---------------------------------------------------------------------------
// Pool constructors
// ---------------------------------------------------------------------------

/// Open a connection pool backed by a file-based SQLite database.
pub fn create_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(())
    });

    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| SeijoError::Internal(e.to_string()))?;

    let conn = pool.get().map_err(|e| SeijoError::Internal(e.to_string()))?;
    run_migrations(&conn)?;

    Ok(pool)
}

/// Open a single-connection pool over an in-memory SQLite database.
///
/// Each in-memory connection is its own database, so the pool is capped at
/// one connection to keep the migrated table visible.
pub fn create_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory();

    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| SeijoError::Internal(e.to_string()))?;

    let conn = pool.get().map_err(|e| SeijoError::Internal(e.to_string()))?;
    run_migrations(&conn)?;

    Ok(pool)
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Text key-value store holding the persisted bank.
pub trait Store: Send + Sync {
    /// Text stored under `key`, or `None` when nothing was ever written.
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Replace the text stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (or create) a file-backed store at `db_path`.
    pub fn open(db_path: &str) -> Result<Self> {
        Ok(Self::new(create_pool(db_path)?))
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(create_memory_pool()?))
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| SeijoError::Internal(e.to_string()))
    }
}

impl Store for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Process-local store, mainly for tests and short-lived embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| SeijoError::Internal(format!("memory store poisoned: {e}")))
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn Store) {
        assert_eq!(store.get("missing").unwrap(), None);
        store.set("k", "one").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("one"));
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn memory_store_get_set() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn sqlite_memory_store_get_set() {
        let store = SqliteStore::open_in_memory().expect("in-memory store");
        exercise(&store);
    }

    #[test]
    fn sqlite_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bank.db");
        let path = path.to_str().expect("utf-8 path");

        {
            let store = SqliteStore::open(path).expect("open");
            store.set("seijo_bank_v1", "[]").unwrap();
        }

        let reopened = SqliteStore::open(path).expect("reopen");
        assert_eq!(reopened.get("seijo_bank_v1").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn file_pool_connections_use_wal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wal.db");
        let pool = create_pool(path.to_str().expect("utf-8 path")).expect("pool");

        let conn = pool.get().expect("connection");
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn migrations_leave_memory_journal_alone() {
        let pool = create_memory_pool().expect("pool");
        let conn = pool.get().expect("connection");
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "memory");
    }
}

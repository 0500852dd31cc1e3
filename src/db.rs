use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;

/// One named slot per key, holding a text blob.
///
/// The student store keeps its whole collection under a single key, so every
/// write replaces the previous blob in one step.
pub trait BlobStore: Send {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

// ============================================================================
// SQLITE BACKEND
// ============================================================================

pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteBlobStore { conn })
    }
}

impl BlobStore for SqliteBlobStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        // Single upsert statement: readers see either the old or the new blob
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases answer "memory")
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

// ============================================================================
// IN-MEMORY BACKEND
// ============================================================================

/// Volatile backend for tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    slots: HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a slot, e.g. with data written by another front end.
    pub fn with_slot(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.slots.insert(key.to_string(), value.to_string());
        store
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_missing_key_reads_none() {
        let store = SqliteBlobStore::open_in_memory().unwrap();
        assert_eq!(store.read("students").unwrap(), None);
    }

    #[test]
    fn test_sqlite_write_overwrites_slot() {
        let mut store = SqliteBlobStore::open_in_memory().unwrap();

        store.write("students", "[1]").unwrap();
        store.write("students", "[1,2]").unwrap();

        assert_eq!(store.read("students").unwrap().as_deref(), Some("[1,2]"));
        let rows: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_sqlite_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        {
            let mut store = SqliteBlobStore::open(&path).unwrap();
            store.write("students", "[]").unwrap();
        }

        let reopened = SqliteBlobStore::open(&path).unwrap();
        assert_eq!(reopened.read("students").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_store_slots_are_independent() {
        let mut store = MemoryBlobStore::with_slot("a", "1");
        store.write("b", "2").unwrap();

        assert_eq!(store.read("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.read("b").unwrap().as_deref(), Some("2"));
        assert_eq!(store.read("c").unwrap(), None);
    }
}

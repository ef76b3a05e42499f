//! Key-value state repository.
//!
//! # Responsibility
//! - Persist JSON-encoded client state under string keys.
//! - Track a per-key revision so other contexts can detect changes.
//!
//! # Invariants
//! - Every write, including removal, bumps the key's revision.
//! - Removal keeps a tombstone row (`value = NULL`) so revisions never reset.

use crate::clock::Clock;
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type KvResult<T> = Result<T, KvError>;

#[derive(Debug)]
pub enum KvError {
    Db(DbError),
    InvalidKey(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidKey(key) => write!(f, "invalid state key: `{key}`"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey(_) => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One stored key with its revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub key: String,
    /// `None` once the key has been removed.
    pub value: Option<String>,
    pub revision: i64,
    pub updated_at: i64,
}

/// Storage seam for persisted client state.
pub trait KvStore {
    fn get(&self, key: &str) -> KvResult<Option<KvEntry>>;
    /// Writes `value` and returns the new revision.
    fn put(&self, key: &str, value: &str) -> KvResult<i64>;
    /// Clears `key` and returns the new revision, if the key ever existed.
    fn remove(&self, key: &str) -> KvResult<Option<i64>>;
}

pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
    clock: Arc<dyn Clock>,
}

impl<'conn> SqliteKvStore<'conn> {
    pub fn new(conn: &'conn Connection, clock: Arc<dyn Clock>) -> Self {
        Self { conn, clock }
    }
}

impl KvStore for SqliteKvStore<'_> {
    fn get(&self, key: &str) -> KvResult<Option<KvEntry>> {
        let key = normalize_key(key)?;
        let entry = self
            .conn
            .query_row(
                "SELECT key, value, revision, updated_at FROM kv_entries WHERE key = ?1;",
                [key],
                |row| {
                    Ok(KvEntry {
                        key: row.get("key")?,
                        value: row.get("value")?,
                        revision: row.get("revision")?,
                        updated_at: row.get("updated_at")?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn put(&self, key: &str, value: &str) -> KvResult<i64> {
        let key = normalize_key(key)?;
        let revision = self.conn.query_row(
            "INSERT INTO kv_entries (key, value, revision, updated_at)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                revision = kv_entries.revision + 1,
                updated_at = excluded.updated_at
             RETURNING revision;",
            params![key, value, self.clock.now_ms()],
            |row| row.get(0),
        )?;
        Ok(revision)
    }

    fn remove(&self, key: &str) -> KvResult<Option<i64>> {
        let key = normalize_key(key)?;
        let revision = self
            .conn
            .query_row(
                "UPDATE kv_entries
                 SET value = NULL, revision = revision + 1, updated_at = ?2
                 WHERE key = ?1
                 RETURNING revision;",
                params![key, self.clock.now_ms()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(revision)
    }
}

fn normalize_key(key: &str) -> KvResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(KvError::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}

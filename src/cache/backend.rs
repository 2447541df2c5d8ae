//! Durable storage trait and SQLite implementation.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::entry::{CacheEntry, CacheStats};

/// Trait for durable cache backends.
///
/// The store treats every backend error as a degradation signal, never as a
/// hard failure, so implementations are free to return errors liberally.
pub trait CacheBackend: Send + Sync {
  /// Get an entry by key. Expiry is not checked here; the store owns that.
  fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

  /// Insert or replace an entry.
  fn put(&self, entry: &CacheEntry) -> Result<()>;

  /// Remove an entry by key.
  fn delete(&self, key: &str) -> Result<()>;

  /// Remove all entries.
  fn clear(&self) -> Result<()>;

  /// Remove every entry that is invalid as of `now_ms`, returning how many
  /// were removed.
  fn delete_expired(&self, now_ms: i64) -> Result<usize>;

  /// Entry count and oldest timestamp.
  fn stats(&self) -> Result<CacheStats>;
}

/// Schema for the cache table.
///
/// The `timestamp` index supports oldest-entry lookup for diagnostics; it is
/// not required for correctness.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS wiki_cache (
    key TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    timestamp INTEGER NOT NULL,
    ttl INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_wiki_cache_timestamp ON wiki_cache(timestamp);
"#;

/// SQLite-based cache backend.
pub struct SqliteBackend {
  conn: Mutex<Connection>,
}

impl SqliteBackend {
  /// Open (or create) the cache database at the given path.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    let backend = Self {
      conn: Mutex::new(conn),
    };
    backend.run_migrations()?;

    Ok(backend)
  }

  /// Get the default database path.
  pub fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("zwiki").join("cache.db"))
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

impl CacheBackend for SqliteBackend {
  fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(Vec<u8>, i64, i64)> = conn
      .query_row(
        "SELECT data, timestamp, ttl FROM wiki_cache WHERE key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache entry: {}", e))?;

    match row {
      Some((data, timestamp, ttl)) => {
        let data = serde_json::from_slice(&data)
          .map_err(|e| eyre!("Failed to deserialize cache entry {}: {}", key, e))?;
        Ok(Some(CacheEntry {
          key: key.to_string(),
          data,
          timestamp,
          ttl,
        }))
      }
      None => Ok(None),
    }
  }

  fn put(&self, entry: &CacheEntry) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let data = serde_json::to_vec(&entry.data)
      .map_err(|e| eyre!("Failed to serialize cache entry: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO wiki_cache (key, data, timestamp, ttl)
         VALUES (?, ?, ?, ?)",
        params![entry.key, data, entry.timestamp, entry.ttl],
      )
      .map_err(|e| eyre!("Failed to store cache entry: {}", e))?;

    Ok(())
  }

  fn delete(&self, key: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute("DELETE FROM wiki_cache WHERE key = ?", params![key])
      .map_err(|e| eyre!("Failed to delete cache entry: {}", e))?;

    Ok(())
  }

  fn clear(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute("DELETE FROM wiki_cache", [])
      .map_err(|e| eyre!("Failed to clear cache: {}", e))?;

    Ok(())
  }

  fn delete_expired(&self, now_ms: i64) -> Result<usize> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let removed = conn
      .execute(
        "DELETE FROM wiki_cache WHERE ? - timestamp > ttl",
        params![now_ms],
      )
      .map_err(|e| eyre!("Failed to sweep expired entries: {}", e))?;

    Ok(removed)
  }

  fn stats(&self) -> Result<CacheStats> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let (count, oldest_timestamp): (u64, Option<i64>) = conn
      .query_row(
        "SELECT COUNT(*), MIN(timestamp) FROM wiki_cache",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .map_err(|e| eyre!("Failed to read cache stats: {}", e))?;

    Ok(CacheStats {
      count,
      oldest_timestamp,
    })
  }
}

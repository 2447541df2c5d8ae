//! Cache store with durable backend and in-memory fallback.

use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

use super::backend::{CacheBackend, SqliteBackend};
use super::entry::{now_ms, CacheEntry, CacheStats, DEFAULT_TTL_MS};

/// Operating mode of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
  /// Entries persist in the durable backend (memory map mirrors writes)
  Durable,
  /// Durable backend unavailable; entries live only in the memory map
  MemoryOnly,
}

/// Key/value store with per-entry expiry.
///
/// Writes always go to the in-memory map; when a durable backend is
/// available they are mirrored there as well, so a durable-write failure
/// still leaves the entry readable for the rest of the session. Backend
/// failures never propagate to callers: reads degrade to the memory map,
/// writes are best-effort.
///
/// Construct once at startup and share via `Arc`.
pub struct CacheStore {
  memory: Mutex<HashMap<String, CacheEntry>>,
  durable: Option<Box<dyn CacheBackend>>,
}

impl CacheStore {
  /// Open the store backed by a SQLite database at `path`.
  ///
  /// Never fails: if the database cannot be opened the store starts in
  /// memory-only mode and the failure is logged.
  pub fn open(path: &Path) -> Self {
    match SqliteBackend::open(path) {
      Ok(backend) => Self {
        memory: Mutex::new(HashMap::new()),
        durable: Some(Box::new(backend)),
      },
      Err(e) => {
        warn!("cache database unavailable, using memory only: {e}");
        Self::memory_only()
      }
    }
  }

  /// A store with no durable backend.
  pub fn memory_only() -> Self {
    Self {
      memory: Mutex::new(HashMap::new()),
      durable: None,
    }
  }

  /// A store over an injected backend.
  pub fn with_backend(backend: impl CacheBackend + 'static) -> Self {
    Self {
      memory: Mutex::new(HashMap::new()),
      durable: Some(Box::new(backend)),
    }
  }

  pub fn mode(&self) -> StoreMode {
    if self.durable.is_some() {
      StoreMode::Durable
    } else {
      StoreMode::MemoryOnly
    }
  }

  /// Get a valid entry's data, or `None`.
  ///
  /// An expired entry is removed and reported absent; it is never returned
  /// again once invalid.
  pub fn get(&self, key: &str) -> Option<Value> {
    let Some(backend) = &self.durable else {
      return self.get_from_memory(key);
    };

    match backend.get(key) {
      Ok(None) => None,
      Ok(Some(entry)) => {
        if entry.is_valid(now_ms()) {
          Some(entry.data)
        } else {
          self.delete(key);
          None
        }
      }
      Err(e) => {
        warn!("cache read failed for {key}, falling back to memory: {e}");
        self.get_from_memory(key)
      }
    }
  }

  /// Store `data` under `key` for `ttl_ms` milliseconds.
  pub fn set(&self, key: &str, data: Value, ttl_ms: i64) {
    let entry = CacheEntry::new(key, data, ttl_ms);

    // The memory map is written first, unconditionally; it carries the
    // session through a failed durable write.
    self.set_in_memory(entry.clone());

    let Some(backend) = &self.durable else {
      return;
    };

    if let Err(e) = backend.put(&entry) {
      warn!("cache write failed for {key}: {e}");
    }
  }

  /// Store `data` under `key` with the default TTL.
  #[allow(dead_code)]
  pub fn set_default(&self, key: &str, data: Value) {
    self.set(key, data, DEFAULT_TTL_MS);
  }

  /// Remove an entry.
  pub fn delete(&self, key: &str) {
    self.delete_from_memory(key);

    let Some(backend) = &self.durable else {
      return;
    };

    if let Err(e) = backend.delete(key) {
      warn!("cache delete failed for {key}: {e}");
    }
  }

  /// Remove all entries.
  pub fn clear(&self) {
    self.clear_memory();

    let Some(backend) = &self.durable else {
      return;
    };

    if let Err(e) = backend.clear() {
      warn!("cache clear failed: {e}");
    }
  }

  /// Sweep expired entries from the durable backend, returning how many
  /// were removed.
  ///
  /// No-op in memory-only mode: the memory map is swept lazily on access
  /// and is bounded by process lifetime.
  pub fn clear_expired(&self) -> usize {
    let Some(backend) = &self.durable else {
      return 0;
    };

    match backend.delete_expired(now_ms()) {
      Ok(removed) => {
        debug!("cache sweep removed {removed} expired entries");
        removed
      }
      Err(e) => {
        warn!("cache sweep failed: {e}");
        0
      }
    }
  }

  /// Entry count and oldest timestamp.
  ///
  /// Memory-only mode reports the map size; oldest-entry tracking needs the
  /// durable backend's timestamp index.
  pub fn stats(&self) -> CacheStats {
    if let Some(backend) = &self.durable {
      match backend.stats() {
        Ok(stats) => return stats,
        Err(e) => warn!("cache stats failed, falling back to memory: {e}"),
      }
    }

    CacheStats {
      count: self.memory.lock().map(|m| m.len() as u64).unwrap_or(0),
      oldest_timestamp: None,
    }
  }

  // Memory map paths. Lock poisoning is treated like any other backend
  // failure: absent data, never a panic across the cache boundary.

  fn get_from_memory(&self, key: &str) -> Option<Value> {
    let mut memory = self.memory.lock().ok()?;
    let entry = memory.get(key)?;

    if entry.is_valid(now_ms()) {
      Some(entry.data.clone())
    } else {
      memory.remove(key);
      None
    }
  }

  fn set_in_memory(&self, entry: CacheEntry) {
    if let Ok(mut memory) = self.memory.lock() {
      memory.insert(entry.key.clone(), entry);
    }
  }

  fn delete_from_memory(&self, key: &str) {
    if let Ok(mut memory) = self.memory.lock() {
      memory.remove(key);
    }
  }

  fn clear_memory(&self) {
    if let Ok(mut memory) = self.memory.lock() {
      memory.clear();
    }
  }

  #[cfg(test)]
  pub(crate) fn insert_entry(&self, entry: CacheEntry) {
    self.set_in_memory(entry.clone());
    if let Some(backend) = &self.durable {
      backend.put(&entry).unwrap();
    }
  }
}

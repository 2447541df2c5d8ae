//! Cache entry and diagnostics types.

use chrono::Utc;
use serde_json::Value;

/// Default time-to-live for entries stored without an explicit TTL: 1 hour.
pub const DEFAULT_TTL_MS: i64 = 60 * 60 * 1000;

/// A single cached resource with its expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
  /// Cache key (`{type}:{segment}:...`)
  pub key: String,
  /// The cached JSON payload
  pub data: Value,
  /// Creation time, milliseconds since epoch
  pub timestamp: i64,
  /// Milliseconds the entry stays valid after `timestamp`
  pub ttl: i64,
}

impl CacheEntry {
  /// Create an entry stamped with the current time.
  pub fn new(key: impl Into<String>, data: Value, ttl_ms: i64) -> Self {
    Self {
      key: key.into(),
      data,
      timestamp: now_ms(),
      ttl: ttl_ms,
    }
  }

  /// An entry is valid iff `now - timestamp <= ttl`.
  pub fn is_valid(&self, now_ms: i64) -> bool {
    now_ms - self.timestamp <= self.ttl
  }
}

/// Current time in milliseconds since epoch.
pub fn now_ms() -> i64 {
  Utc::now().timestamp_millis()
}

/// Diagnostic counters for the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
  /// Number of stored entries
  pub count: u64,
  /// Timestamp of the oldest entry, if any (unavailable in memory-only mode)
  pub oldest_timestamp: Option<i64>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn entry_valid_within_ttl() {
    let entry = CacheEntry {
      key: "versions".into(),
      data: json!({"versions": []}),
      timestamp: 1_000,
      ttl: 500,
    };

    assert!(entry.is_valid(1_000));
    assert!(entry.is_valid(1_500));
    assert!(!entry.is_valid(1_501));
  }

  #[test]
  fn new_entry_is_valid_now() {
    let entry = CacheEntry::new("sections", json!({"sections": []}), DEFAULT_TTL_MS);
    assert!(entry.is_valid(now_ms()));
  }
}

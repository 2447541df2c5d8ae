//! Cached fetch layer: resolve a resource from the store or the network.

use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use super::store::CacheStore;

/// Fetch-or-serve-from-cache over a shared [`CacheStore`].
///
/// The layer traffics in raw JSON values so the cache holds exactly what
/// the server returned; typed decoding belongs to the accessors. Callers
/// supply the cache key, the TTL, and a fetcher closure that performs the
/// actual network request. Cache population is best-effort; a store
/// failure never fails the fetch.
pub struct CachedFetch {
  store: Arc<CacheStore>,
}

impl CachedFetch {
  pub fn new(store: Arc<CacheStore>) -> Self {
    Self { store }
  }

  /// Resolve a resource.
  ///
  /// Unless `skip_cache` is set, a valid cached value is returned without
  /// touching the network. On a miss the fetcher runs, and its result is
  /// stored under `cache_key` for `ttl_ms` before being returned. Fetcher
  /// errors propagate unchanged and leave the cache untouched.
  pub async fn fetch<E, F, Fut>(
    &self,
    cache_key: &str,
    ttl_ms: i64,
    skip_cache: bool,
    fetcher: F,
  ) -> Result<Value, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, E>>,
  {
    if !skip_cache {
      if let Some(value) = self.store.get(cache_key) {
        return Ok(value);
      }
    }

    let value = fetcher().await?;
    self.store.set(cache_key, value.clone(), ttl_ms);

    Ok(value)
  }

  /// Warm the cache for a resource without affecting the caller.
  ///
  /// Checks the cache; if the key is absent, fetches and stores, discarding
  /// the result. All errors are swallowed.
  pub async fn prefetch<E, F, Fut>(&self, cache_key: &str, ttl_ms: i64, fetcher: F)
  where
    E: std::fmt::Display,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, E>>,
  {
    if self.store.get(cache_key).is_some() {
      return;
    }

    match fetcher().await {
      Ok(value) => self.store.set(cache_key, value, ttl_ms),
      Err(e) => debug!("prefetch failed for {cache_key}: {e}"),
    }
  }
}

impl Clone for CachedFetch {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::sync::atomic::{AtomicUsize, Ordering};

  const HOUR_MS: i64 = 60 * 60 * 1000;

  fn layer() -> (Arc<CacheStore>, CachedFetch) {
    let store = Arc::new(CacheStore::memory_only());
    (Arc::clone(&store), CachedFetch::new(store))
  }

  #[tokio::test]
  async fn miss_fetches_once_then_hits() {
    let (store, layer) = layer();
    let calls = AtomicUsize::new(0);

    let categories =
      json!({"categories": [{"id": "lua-api", "name": "Lua API", "articleCount": 5}]});

    let first = layer
      .fetch("categories:build-41:modding", 12 * HOUR_MS, false, || {
        calls.fetch_add(1, Ordering::SeqCst);
        let categories = categories.clone();
        async move { Ok::<_, String>(categories) }
      })
      .await
      .unwrap();
    assert_eq!(first, categories);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // The exact fetched payload is retrievable from the store directly.
    assert_eq!(
      store.get("categories:build-41:modding"),
      Some(categories.clone())
    );

    // Second call is served from cache: no network.
    let second = layer
      .fetch("categories:build-41:modding", 12 * HOUR_MS, false, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, String>(json!(null)) }
      })
      .await
      .unwrap();
    assert_eq!(second, categories);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn skip_cache_always_fetches() {
    let (store, layer) = layer();
    let calls = AtomicUsize::new(0);

    for _ in 0..2 {
      layer
        .fetch("versions", 24 * HOUR_MS, true, || {
          calls.fetch_add(1, Ordering::SeqCst);
          async move { Ok::<_, String>(json!({"versions": []})) }
        })
        .await
        .unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    // The forced fetch still repopulates the cache.
    assert_eq!(store.get("versions"), Some(json!({"versions": []})));
  }

  #[tokio::test]
  async fn fetcher_error_propagates_and_caches_nothing() {
    let (store, layer) = layer();

    let result = layer
      .fetch(
        "article:b41:modding:lua-api:missing",
        6 * HOUR_MS,
        false,
        || async { Err("HTTP 404".to_string()) },
      )
      .await;

    assert_eq!(result.unwrap_err(), "HTTP 404");
    assert_eq!(
      store.get("article:b41:modding:lua-api:missing"),
      None
    );
  }

  #[tokio::test]
  async fn prefetch_populates_when_absent() {
    let (store, layer) = layer();

    layer
      .prefetch("article:b41:modding:lua-api:events", 6 * HOUR_MS, || async {
        Ok::<_, String>(json!({"id": "events"}))
      })
      .await;

    assert_eq!(
      store.get("article:b41:modding:lua-api:events"),
      Some(json!({"id": "events"}))
    );
  }

  #[tokio::test]
  async fn prefetch_skips_network_when_present() {
    let (store, layer) = layer();
    let calls = AtomicUsize::new(0);

    store.set("versions", json!({"versions": []}), HOUR_MS);

    layer
      .prefetch("versions", HOUR_MS, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, String>(json!(null)) }
      })
      .await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.get("versions"), Some(json!({"versions": []})));
  }

  #[tokio::test]
  async fn prefetch_swallows_errors() {
    let (store, layer) = layer();

    layer
      .prefetch("sections", HOUR_MS, || async {
        Err::<Value, _>("connection refused".to_string())
      })
      .await;

    assert_eq!(store.get("sections"), None);
  }
}

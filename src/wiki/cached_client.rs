//! Cached wiki client: typed accessors over the cached fetch layer.

use serde_json::Value;
use std::sync::Arc;

use crate::cache::{CacheStore, CachedFetch};

use super::client::{decode, FetchError, WikiClient};
use super::keys::ResourceKey;
use super::types::{
  Article, ArticleIndex, ArticleSummary, CategoriesIndex, Category, SearchEntry, Section,
  SectionsIndex, Version, VersionsIndex,
};

/// Wiki client with transparent caching.
///
/// Wraps [`WikiClient`] and exposes one accessor per published resource.
/// Every accessor resolves through the cache store first; `skip_cache`
/// forces a network fetch (which still repopulates the cache).
#[derive(Clone)]
pub struct CachedWikiClient {
  inner: WikiClient,
  cache: CachedFetch,
}

impl CachedWikiClient {
  pub fn new(inner: WikiClient, store: Arc<CacheStore>) -> Self {
    Self {
      inner,
      cache: CachedFetch::new(store),
    }
  }

  /// Resolve a resource's raw JSON through the cache.
  async fn fetch_resource(
    &self,
    key: &ResourceKey<'_>,
    skip_cache: bool,
  ) -> Result<Value, FetchError> {
    let path = key.url_path();

    self
      .cache
      .fetch(&key.cache_key(), key.ttl_ms(), skip_cache, || {
        let inner = self.inner.clone();
        let path = path.clone();
        async move { inner.fetch_json(&path).await }
      })
      .await
  }

  /// All published versions.
  pub async fn versions(&self, skip_cache: bool) -> Result<Vec<Version>, FetchError> {
    let key = ResourceKey::Versions;
    let value = self.fetch_resource(&key, skip_cache).await?;
    let index: VersionsIndex = decode(&key.url_path(), value)?;
    Ok(index.versions)
  }

  /// Metadata for a single version.
  pub async fn version_info(
    &self,
    version: &str,
    skip_cache: bool,
  ) -> Result<Version, FetchError> {
    let key = ResourceKey::VersionInfo { version };
    let value = self.fetch_resource(&key, skip_cache).await?;
    decode(&key.url_path(), value)
  }

  /// All content sections.
  pub async fn sections(&self, skip_cache: bool) -> Result<Vec<Section>, FetchError> {
    let key = ResourceKey::Sections;
    let value = self.fetch_resource(&key, skip_cache).await?;
    let index: SectionsIndex = decode(&key.url_path(), value)?;
    Ok(index.sections)
  }

  /// Metadata for one section of a version.
  pub async fn section_info(
    &self,
    version: &str,
    section: &str,
    skip_cache: bool,
  ) -> Result<Section, FetchError> {
    let key = ResourceKey::SectionInfo { version, section };
    let value = self.fetch_resource(&key, skip_cache).await?;
    decode(&key.url_path(), value)
  }

  /// Categories within a section.
  pub async fn categories(
    &self,
    version: &str,
    section: &str,
    skip_cache: bool,
  ) -> Result<Vec<Category>, FetchError> {
    let key = ResourceKey::Categories { version, section };
    let value = self.fetch_resource(&key, skip_cache).await?;
    let index: CategoriesIndex = decode(&key.url_path(), value)?;
    Ok(index.categories)
  }

  /// Article listing for a category.
  pub async fn articles(
    &self,
    version: &str,
    section: &str,
    category: &str,
    skip_cache: bool,
  ) -> Result<Vec<ArticleSummary>, FetchError> {
    let key = ResourceKey::ArticleList {
      version,
      section,
      category,
    };
    let value = self.fetch_resource(&key, skip_cache).await?;
    let index: ArticleIndex = decode(&key.url_path(), value)?;
    Ok(index.articles)
  }

  /// A single article with full content.
  pub async fn article(
    &self,
    version: &str,
    section: &str,
    category: &str,
    slug: &str,
    skip_cache: bool,
  ) -> Result<Article, FetchError> {
    let key = ResourceKey::Article {
      version,
      section,
      category,
      slug,
    };
    let value = self.fetch_resource(&key, skip_cache).await?;
    decode(&key.url_path(), value)
  }

  /// Flat article metadata for search.
  pub async fn search_index(&self, skip_cache: bool) -> Result<Vec<SearchEntry>, FetchError> {
    let key = ResourceKey::SearchIndex;
    let value = self.fetch_resource(&key, skip_cache).await?;
    decode(&key.url_path(), value)
  }

  /// Warm the cache for an article without surfacing errors or results.
  pub async fn prefetch_article(&self, version: &str, section: &str, category: &str, slug: &str) {
    let key = ResourceKey::Article {
      version,
      section,
      category,
      slug,
    };
    let path = key.url_path();

    self
      .cache
      .prefetch(&key.cache_key(), key.ttl_ms(), || {
        let inner = self.inner.clone();
        async move { inner.fetch_json(&path).await }
      })
      .await;
  }

  /// Speculatively warm the cache for an article's related articles.
  pub async fn prefetch_related(&self, article: &Article) {
    let prefetches = article.related_articles.iter().map(|slug| {
      self.prefetch_article(&article.version, &article.section, &article.category, slug)
    });

    futures::future::join_all(prefetches).await;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  /// A client whose base URL refuses connections; any network attempt
  /// fails, so these tests prove which calls are served purely from cache.
  fn offline_client(store: Arc<CacheStore>) -> CachedWikiClient {
    let inner = WikiClient::new("http://127.0.0.1:9/wiki").unwrap();
    CachedWikiClient::new(inner, store)
  }

  /// Serve exactly one HTTP response, then shut down. A second request to
  /// the returned base URL fails to connect.
  async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
      if let Ok((mut socket, _)) = listener.accept().await {
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;

        let response = format!(
          "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
          status_line,
          body.len(),
          body
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
      }
    });

    format!("http://{}/", addr)
  }

  fn client_for(base: &str, store: &Arc<CacheStore>) -> CachedWikiClient {
    CachedWikiClient::new(WikiClient::new(base).unwrap(), Arc::clone(store))
  }

  #[tokio::test]
  async fn categories_fetch_populates_cache_end_to_end() {
    let body = r#"{"categories":[{"id":"lua-api","name":"Lua API","articleCount":5}]}"#;
    let base = serve_once("200 OK", body).await;
    let store = Arc::new(CacheStore::memory_only());
    let client = client_for(&base, &store);

    let categories = client.categories("build-41", "modding", false).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].article_count, Some(5));

    // The exact fetched envelope landed under the expected key.
    assert_eq!(
      store.get("categories:build-41:modding"),
      Some(json!({"categories": [{"id": "lua-api", "name": "Lua API", "articleCount": 5}]}))
    );

    // The server only answered once; this call must come from the cache.
    let again = client.categories("build-41", "modding", false).await.unwrap();
    assert_eq!(again[0].id, "lua-api");
  }

  #[tokio::test]
  async fn missing_article_rejects_with_status_and_caches_nothing() {
    let base = serve_once("404 Not Found", "").await;
    let store = Arc::new(CacheStore::memory_only());
    let client = client_for(&base, &store);

    let err = client
      .article("build-41", "modding", "lua-api", "missing", false)
      .await
      .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(store.get("article:build-41:modding:lua-api:missing"), None);
    assert_eq!(store.stats().count, 0);
  }

  #[tokio::test]
  async fn malformed_body_rejects_with_parse_error_and_caches_nothing() {
    let base = serve_once("200 OK", "<html>not json</html>").await;
    let store = Arc::new(CacheStore::memory_only());
    let client = client_for(&base, &store);

    let err = client.sections(false).await.unwrap_err();

    assert!(matches!(err, FetchError::Parse { .. }));
    assert_eq!(store.stats().count, 0);
  }

  #[tokio::test]
  async fn categories_resolve_from_cache_without_network() {
    let store = Arc::new(CacheStore::memory_only());
    store.set(
      "categories:build-41:modding",
      json!({"categories": [{"id": "lua-api", "name": "Lua API", "articleCount": 5}]}),
      12 * 60 * 60 * 1000,
    );

    let client = offline_client(store);
    let categories = client.categories("build-41", "modding", false).await.unwrap();

    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].id, "lua-api");
    assert_eq!(categories[0].article_count, Some(5));
  }

  #[tokio::test]
  async fn article_resolves_from_cache_without_network() {
    let store = Arc::new(CacheStore::memory_only());
    store.set(
      "article:build-41:modding:lua-api:events",
      json!({
        "id": "events",
        "title": "Event Handlers",
        "slug": "events",
        "version": "build-41",
        "section": "modding",
        "category": "lua-api",
        "tags": ["lua"],
        "content": "# Event Handlers",
        "excerpt": "Hooking game events.",
        "lastUpdated": "2024-01-15",
        "tableOfContents": []
      }),
      6 * 60 * 60 * 1000,
    );

    let client = offline_client(store);
    let article = client
      .article("build-41", "modding", "lua-api", "events", false)
      .await
      .unwrap();

    assert_eq!(article.title, "Event Handlers");
    assert_eq!(article.version, "build-41");
  }

  #[tokio::test]
  async fn skip_cache_bypasses_a_populated_cache() {
    let store = Arc::new(CacheStore::memory_only());
    store.set("versions", json!({"versions": []}), 24 * 60 * 60 * 1000);

    let client = offline_client(store);
    // Cache hit works...
    assert!(client.versions(false).await.is_ok());
    // ...but skipping the cache forces the (unreachable) network.
    assert!(client.versions(true).await.is_err());
  }

  #[tokio::test]
  async fn prefetch_swallows_network_failures() {
    let store = Arc::new(CacheStore::memory_only());
    let client = offline_client(Arc::clone(&store));

    client
      .prefetch_article("build-41", "modding", "lua-api", "events")
      .await;

    assert_eq!(store.get("article:build-41:modding:lua-api:events"), None);
    assert_eq!(store.stats().count, 0);
  }
}

//! Resource identity: cache key, URL path and TTL class per resource type.

const HOUR_MS: i64 = 60 * 60 * 1000;

/// TTL classes for the content families.
pub const TTL_VERSIONS_MS: i64 = 24 * HOUR_MS;
pub const TTL_SECTIONS_MS: i64 = 24 * HOUR_MS;
pub const TTL_CATEGORIES_MS: i64 = 12 * HOUR_MS;
pub const TTL_ARTICLES_MS: i64 = 6 * HOUR_MS;
pub const TTL_SEARCH_INDEX_MS: i64 = 24 * HOUR_MS;

/// Identity of a fetchable wiki resource.
///
/// Each variant knows its cache key (a type tag plus the identifying path
/// segments, colon-joined), its URL under the `data/` prefix, and how long
/// a cached copy stays valid.
#[derive(Clone, Debug)]
pub enum ResourceKey<'a> {
  /// All published versions
  Versions,
  /// Metadata for one version
  VersionInfo { version: &'a str },
  /// All content sections
  Sections,
  /// Metadata for one section of a version
  SectionInfo { version: &'a str, section: &'a str },
  /// Categories within a section
  Categories { version: &'a str, section: &'a str },
  /// Article listing for a category
  ArticleList {
    version: &'a str,
    section: &'a str,
    category: &'a str,
  },
  /// A single article
  Article {
    version: &'a str,
    section: &'a str,
    category: &'a str,
    slug: &'a str,
  },
  /// Flat article metadata for search
  SearchIndex,
}

impl ResourceKey<'_> {
  /// Deterministic cache key: type tag plus segments, empty segments
  /// omitted.
  pub fn cache_key(&self) -> String {
    match self {
      Self::Versions => join_key(&["versions"]),
      Self::VersionInfo { version } => join_key(&["version-info", version]),
      Self::Sections => join_key(&["sections"]),
      Self::SectionInfo { version, section } => join_key(&["section-info", version, section]),
      Self::Categories { version, section } => join_key(&["categories", version, section]),
      Self::ArticleList {
        version,
        section,
        category,
      } => join_key(&["articles-list", version, section, category]),
      Self::Article {
        version,
        section,
        category,
        slug,
      } => join_key(&["article", version, section, category, slug]),
      Self::SearchIndex => join_key(&["search-index"]),
    }
  }

  /// Location of the resource under the content root.
  pub fn url_path(&self) -> String {
    match self {
      Self::Versions => "data/versions.json".to_string(),
      Self::VersionInfo { version } => format!("data/{}/version-info.json", version),
      Self::Sections => "data/sections.json".to_string(),
      Self::SectionInfo { version, section } => {
        format!("data/{}/{}/section-info.json", version, section)
      }
      Self::Categories { version, section } => {
        format!("data/{}/{}/categories.json", version, section)
      }
      Self::ArticleList {
        version,
        section,
        category,
      } => format!("data/{}/{}/{}/index.json", version, section, category),
      Self::Article {
        version,
        section,
        category,
        slug,
      } => format!("data/{}/{}/{}/{}.json", version, section, category, slug),
      Self::SearchIndex => "data/search-index.json".to_string(),
    }
  }

  /// How long a cached copy of this resource stays valid.
  pub fn ttl_ms(&self) -> i64 {
    match self {
      Self::Versions | Self::VersionInfo { .. } => TTL_VERSIONS_MS,
      Self::Sections | Self::SectionInfo { .. } => TTL_SECTIONS_MS,
      Self::Categories { .. } => TTL_CATEGORIES_MS,
      Self::ArticleList { .. } | Self::Article { .. } => TTL_ARTICLES_MS,
      Self::SearchIndex => TTL_SEARCH_INDEX_MS,
    }
  }
}

/// Join non-empty segments with the key separator.
fn join_key(parts: &[&str]) -> String {
  parts
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(":")
}

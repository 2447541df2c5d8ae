//! Content types for the published wiki JSON.
//!
//! Shapes follow the static data layout produced by the wiki build step.
//! Optional fields tolerate absence so older content snapshots keep
//! loading.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
  Current,
  Legacy,
  Upcoming,
}

/// A published wiki version, e.g. "build-41".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub release_date: Option<String>,
  pub status: VersionStatus,
  #[serde(default)]
  pub sections: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub features: Option<Vec<String>>,
}

/// `/data/versions.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionsIndex {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_version: Option<String>,
  pub versions: Vec<Version>,
}

/// A top-level content section within a version, e.g. "modding".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub icon: String,
}

/// `/data/sections.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsIndex {
  pub sections: Vec<Section>,
}

/// An article category within a section, e.g. "lua-api".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub icon: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub article_count: Option<u32>,
}

/// `/data/{version}/{section}/categories.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesIndex {
  pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Beginner,
  Intermediate,
  Advanced,
}

/// A table-of-contents heading inside an article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocItem {
  pub id: String,
  pub text: String,
  /// Heading level, 1-6
  pub level: u8,
}

/// A suggested follow-up article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextStep {
  pub title: String,
  pub url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// Listing entry for a category's article index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
  pub id: String,
  pub title: String,
  pub slug: String,
  #[serde(default)]
  pub excerpt: String,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub difficulty: Option<Difficulty>,
  #[serde(default)]
  pub last_updated: String,
}

/// `/data/{version}/{section}/{category}/index.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleIndex {
  pub articles: Vec<ArticleSummary>,
}

/// Full article content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
  pub id: String,
  pub title: String,
  pub slug: String,
  pub version: String,
  pub section: String,
  pub category: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subcategory: Option<String>,
  #[serde(default)]
  pub tags: Vec<String>,
  /// Markdown body
  pub content: String,
  #[serde(default)]
  pub excerpt: String,
  /// Slugs of related articles in the same category
  #[serde(default)]
  pub related_articles: Vec<String>,
  #[serde(default)]
  pub last_updated: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub difficulty: Option<Difficulty>,
  #[serde(default)]
  pub table_of_contents: Vec<TocItem>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next_steps: Option<Vec<NextStep>>,
}

/// One row of `/data/search-index.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEntry {
  pub id: String,
  pub title: String,
  pub slug: String,
  pub url: String,
  pub version: String,
  pub section: String,
  pub category: String,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default)]
  pub excerpt: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub difficulty: Option<Difficulty>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn category_tolerates_minimal_shape() {
    let index: CategoriesIndex = serde_json::from_value(serde_json::json!({
      "categories": [{"id": "lua-api", "name": "Lua API", "articleCount": 5}]
    }))
    .unwrap();

    assert_eq!(index.categories.len(), 1);
    let category = &index.categories[0];
    assert_eq!(category.id, "lua-api");
    assert_eq!(category.article_count, Some(5));
    assert!(category.description.is_empty());
  }

  #[test]
  fn article_decodes_published_shape() {
    let article: Article = serde_json::from_value(serde_json::json!({
      "id": "getting-started",
      "title": "Getting Started",
      "slug": "getting-started",
      "version": "build-41",
      "section": "modding",
      "category": "basics",
      "tags": ["intro"],
      "content": "# Getting Started\n\nWelcome.",
      "excerpt": "Welcome.",
      "relatedArticles": ["mod-structure"],
      "lastUpdated": "2024-03-01",
      "difficulty": "beginner",
      "tableOfContents": [{"id": "getting-started", "text": "Getting Started", "level": 1}]
    }))
    .unwrap();

    assert_eq!(article.difficulty, Some(Difficulty::Beginner));
    assert_eq!(article.related_articles, vec!["mod-structure"]);
    assert_eq!(article.table_of_contents[0].level, 1);
    assert!(article.next_steps.is_none());
  }
}

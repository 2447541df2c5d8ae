//! Search over the wiki's flat article index.

use crate::wiki::types::SearchEntry;

/// Match tiers, best first: exact title, title prefix, word prefix in
/// title, substring in title, tag match, substring in excerpt.
fn match_priority(entry: &SearchEntry, query: &str) -> Option<u32> {
  let title = entry.title.to_lowercase();

  if title == query {
    return Some(0);
  }
  if title.starts_with(query) {
    return Some(1);
  }
  if title.split_whitespace().any(|w| w.starts_with(query)) {
    return Some(2);
  }
  if title.contains(query) {
    return Some(3);
  }
  if entry
    .tags
    .iter()
    .any(|t| t.to_lowercase().starts_with(query))
  {
    return Some(4);
  }
  if entry.excerpt.to_lowercase().contains(query) {
    return Some(5);
  }

  None
}

/// Rank index entries against a query, best matches first.
///
/// Ties within a tier are broken by title so output stays stable.
pub fn rank<'a>(index: &'a [SearchEntry], query: &str, limit: usize) -> Vec<&'a SearchEntry> {
  let query = query.trim().to_lowercase();
  if query.is_empty() {
    return Vec::new();
  }

  let mut matches: Vec<(u32, &SearchEntry)> = index
    .iter()
    .filter_map(|entry| match_priority(entry, &query).map(|p| (p, entry)))
    .collect();

  matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.title.cmp(&b.1.title)));
  matches.into_iter().map(|(_, entry)| entry).take(limit).collect()
}

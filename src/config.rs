use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cache::SqliteBackend;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub wiki: WikiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WikiConfig {
  /// Root URL the wiki's `data/` tree is served under
  pub base_url: String,
  /// Version to browse when none is given on the command line
  pub default_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
  /// Directory for the cache database (defaults to the platform data dir)
  pub dir: Option<PathBuf>,
  /// Keep the cache in memory only, never on disk
  #[serde(default)]
  pub disabled: bool,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./zwiki.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/zwiki/config.yaml
  /// 4. ~/.config/zwiki/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/zwiki/config.yaml\n\
                 or pass --base-url."
      )),
    }
  }

  /// A configuration built from a base URL alone (no config file).
  pub fn from_base_url(base_url: &str) -> Self {
    Self {
      wiki: WikiConfig {
        base_url: base_url.to_string(),
        default_version: None,
      },
      cache: CacheConfig::default(),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("zwiki.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("zwiki").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Location of the cache database.
  pub fn cache_db_path(&self) -> Result<PathBuf> {
    match &self.cache.dir {
      Some(dir) => Ok(dir.join("cache.db")),
      None => SqliteBackend::default_path(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_full_config() {
    let config: Config = serde_yaml::from_str(
      r#"
wiki:
  base_url: https://wiki.example.org/
  default_version: build-41
cache:
  dir: /tmp/zwiki-cache
"#,
    )
    .unwrap();

    assert_eq!(config.wiki.base_url, "https://wiki.example.org/");
    assert_eq!(config.wiki.default_version.as_deref(), Some("build-41"));
    assert!(!config.cache.disabled);
    assert_eq!(
      config.cache_db_path().unwrap(),
      PathBuf::from("/tmp/zwiki-cache/cache.db")
    );
  }

  #[test]
  fn cache_section_is_optional() {
    let config: Config = serde_yaml::from_str(
      r#"
wiki:
  base_url: https://wiki.example.org/
"#,
    )
    .unwrap();

    assert!(config.cache.dir.is_none());
    assert!(!config.cache.disabled);
  }

  #[test]
  fn missing_explicit_path_is_an_error() {
    assert!(Config::load(Some(Path::new("/nonexistent/zwiki.yaml"))).is_err());
  }
}

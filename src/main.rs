mod cache;
mod config;
mod search;
mod wiki;

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;

use cache::{CacheStore, StoreMode};
use config::Config;
use wiki::types::{Article, Difficulty, VersionStatus};
use wiki::{CachedWikiClient, WikiClient};

#[derive(Parser, Debug)]
#[command(name = "zwiki")]
#[command(about = "A terminal reader for static documentation wikis")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/zwiki/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Wiki base URL (skips the config file)
  #[arg(short, long)]
  base_url: Option<String>,

  /// Bypass the cache and refetch from the network
  #[arg(long)]
  refresh: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List published wiki versions
  Versions,
  /// Show metadata for one version
  Version {
    /// Version id (falls back to default_version from the config)
    id: Option<String>,
  },
  /// List content sections
  Sections,
  /// Show metadata for one section of a version
  Section { version: String, section: String },
  /// List categories within a section
  Categories { version: String, section: String },
  /// List articles within a category
  Articles {
    version: String,
    section: String,
    category: String,
  },
  /// Print a single article
  Article {
    version: String,
    section: String,
    category: String,
    slug: String,
  },
  /// Search the article index
  Search {
    query: String,
    /// Maximum number of results
    #[arg(short, long, default_value_t = 10)]
    limit: usize,
  },
  /// Cache maintenance
  Cache {
    #[command(subcommand)]
    action: CacheAction,
  },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
  /// Show entry count and oldest entry
  Stats,
  /// Remove every cached entry
  Clear,
  /// Remove expired entries
  Sweep,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let config = match &args.base_url {
    Some(base_url) => Config::from_base_url(base_url),
    None => Config::load(args.config.as_deref())?,
  };

  let store = if config.cache.disabled {
    CacheStore::memory_only()
  } else {
    CacheStore::open(&config.cache_db_path()?)
  };
  let store = Arc::new(store);

  let client = CachedWikiClient::new(WikiClient::new(&config.wiki.base_url)?, Arc::clone(&store));
  let refresh = args.refresh;

  match args.command {
    Command::Versions => {
      for version in client.versions(refresh).await? {
        println!(
          "{:<16} {:<10} {}",
          version.id,
          status_label(version.status),
          version.name
        );
      }
    }
    Command::Version { id } => {
      let id = id
        .or(config.wiki.default_version)
        .ok_or_else(|| eyre!("No version given and no default_version configured"))?;
      let version = client.version_info(&id, refresh).await?;

      println!("{} ({})", version.name, status_label(version.status));
      if let Some(date) = &version.release_date {
        println!("released: {}", date);
      }
      if let Some(description) = &version.description {
        println!("\n{}", description);
      }
      if !version.sections.is_empty() {
        println!("\nsections: {}", version.sections.join(", "));
      }
    }
    Command::Sections => {
      for section in client.sections(refresh).await? {
        println!("{:<16} {}", section.id, section.description);
      }
    }
    Command::Section { version, section } => {
      let info = client.section_info(&version, &section, refresh).await?;
      println!("{}\n{}", info.name, info.description);
    }
    Command::Categories { version, section } => {
      for category in client.categories(&version, &section, refresh).await? {
        let count = category
          .article_count
          .map(|n| format!("{:>4}", n))
          .unwrap_or_else(|| "   -".to_string());
        println!("{:<24} {} {}", category.id, count, category.name);
      }
    }
    Command::Articles {
      version,
      section,
      category,
    } => {
      for article in client.articles(&version, &section, &category, refresh).await? {
        let difficulty = article
          .difficulty
          .map(difficulty_label)
          .unwrap_or("-");
        println!("{:<32} {:<12} {}", article.slug, difficulty, article.title);
      }
    }
    Command::Article {
      version,
      section,
      category,
      slug,
    } => {
      let article = match client
        .article(&version, &section, &category, &slug, refresh)
        .await
      {
        Ok(article) => article,
        Err(e) if e.status() == Some(404) => {
          return Err(eyre!(
            "article not found: {}/{}/{}/{}\n\
             see `zwiki articles {} {} {}` for the category listing",
            version,
            section,
            category,
            slug,
            version,
            section,
            category
          ));
        }
        Err(e) => return Err(e.into()),
      };
      print_article(&article);

      // Warm the cache for likely next reads.
      client.prefetch_related(&article).await;
    }
    Command::Search { query, limit } => {
      let index = client.search_index(refresh).await?;
      for entry in search::rank(&index, &query, limit) {
        println!("{:<48} {}", entry.url, entry.title);
      }
    }
    Command::Cache { action } => run_cache_action(&store, action),
  }

  Ok(())
}

fn run_cache_action(store: &CacheStore, action: CacheAction) {
  match action {
    CacheAction::Stats => {
      let stats = store.stats();
      let mode = match store.mode() {
        StoreMode::Durable => "durable",
        StoreMode::MemoryOnly => "memory-only",
      };
      println!("mode:    {}", mode);
      println!("entries: {}", stats.count);
      match stats.oldest_timestamp {
        Some(ts) => match chrono::DateTime::from_timestamp_millis(ts) {
          Some(when) => println!("oldest:  {}", when.to_rfc3339()),
          None => println!("oldest:  (invalid timestamp {})", ts),
        },
        None => println!("oldest:  -"),
      }
    }
    CacheAction::Clear => {
      store.clear();
      println!("cache cleared");
    }
    CacheAction::Sweep => {
      let removed = store.clear_expired();
      println!("removed {} expired entries", removed);
    }
  }
}

fn print_article(article: &Article) {
  println!("{}", article.title);
  println!(
    "{}/{}/{} · updated {}",
    article.version, article.section, article.category, article.last_updated
  );
  if let Some(difficulty) = article.difficulty {
    println!("difficulty: {}", difficulty_label(difficulty));
  }
  if !article.tags.is_empty() {
    println!("tags: {}", article.tags.join(", "));
  }
  println!();
  println!("{}", article.content);

  if !article.related_articles.is_empty() {
    println!("\nrelated: {}", article.related_articles.join(", "));
  }
}

fn status_label(status: VersionStatus) -> &'static str {
  match status {
    VersionStatus::Current => "current",
    VersionStatus::Legacy => "legacy",
    VersionStatus::Upcoming => "upcoming",
  }
}

fn difficulty_label(difficulty: Difficulty) -> &'static str {
  match difficulty {
    Difficulty::Beginner => "beginner",
    Difficulty::Intermediate => "intermediate",
    Difficulty::Advanced => "advanced",
  }
}

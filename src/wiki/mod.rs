//! Wiki content: types, HTTP client and cached accessors.

pub mod cached_client;
pub mod client;
pub mod keys;
pub mod types;

pub use cached_client::CachedWikiClient;
pub use client::{FetchError, WikiClient};
pub use keys::ResourceKey;

//! Storage Layer - SQLite-backed cache
//!
//! Tables:
//! - feeds(id, title, url, website, icon_url, velocity, subscribers, updated, state)
//! - categories(id, label)
//! - entries(id, origin_id, title, author, url, published, crawled, updated, content, summary, unread, starred)
//! - feeds_categories(feed_id, category_id)
//! - entries_tags(entry_id, tag)
//!
//! plus the `feeds_by_category` view.

pub mod schema;
pub mod sqlite;

pub use sqlite::{CacheStore, DbStats};

//! Routing - resolves resource addresses to the closed set of routes
//!
//! | Address                          | Route                  |
//! |----------------------------------|------------------------|
//! | `entries/<n>`                    | `SingleEntry`          |
//! | `entries`                        | `EntryCollection`      |
//! | `feeds/<n>`                      | `SingleFeed`           |
//! | `feeds`                          | `FeedCollection`       |
//! | `feeds_by_category/<category>`   | `FeedsByCategory`      |
//! | `categories/<n>`                 | `SingleCategory`       |
//! | `categories`                     | `CategoryCollection`   |
//! | `feeds_categories`               | `FeedsCategories`      |
//! | `entries_tags`                   | `EntriesTags`          |
//! | no path                          | `Root`                 |
//!
//! Single-record segments must be numeric; anything else is `Unmatched`.

use crate::address::ResourceAddress;
use crate::contract::{self, ConflictPolicy};

/// Authority used when no configuration overrides it.
pub const DEFAULT_AUTHORITY: &str = "feedly.cache";

/// Every resource shape the cache understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SingleEntry,
    EntryCollection,
    SingleFeed,
    FeedCollection,
    /// Feeds filed under the decoded category id
    FeedsByCategory(String),
    SingleCategory,
    CategoryCollection,
    FeedsCategories,
    EntriesTags,
    Root,
    Unmatched,
}

impl Route {
    /// Table or view backing this route
    pub fn relation(&self) -> Option<&'static str> {
        match self {
            Route::SingleEntry | Route::EntryCollection => Some(contract::entries::TABLE),
            Route::SingleFeed | Route::FeedCollection => Some(contract::feeds::TABLE),
            Route::FeedsByCategory(_) => Some(contract::feeds_by_category::VIEW),
            Route::SingleCategory | Route::CategoryCollection => {
                Some(contract::categories::TABLE)
            }
            Route::FeedsCategories => Some(contract::feeds_categories::TABLE),
            Route::EntriesTags => Some(contract::entries_tags::TABLE),
            Route::Root | Route::Unmatched => None,
        }
    }

    /// Conflict policy applied when inserting through this route.
    ///
    /// `None` means the route does not accept inserts.
    pub fn conflict_policy(&self) -> Option<ConflictPolicy> {
        match self {
            Route::EntryCollection | Route::FeedCollection | Route::CategoryCollection => {
                Some(ConflictPolicy::Replace)
            }
            Route::FeedsCategories | Route::EntriesTags => Some(ConflictPolicy::Ignore),
            Route::SingleEntry
            | Route::SingleFeed
            | Route::FeedsByCategory(_)
            | Route::SingleCategory
            | Route::Root
            | Route::Unmatched => None,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Route::SingleEntry => "single-entry",
            Route::EntryCollection => "entries",
            Route::SingleFeed => "single-feed",
            Route::FeedCollection => "feeds",
            Route::FeedsByCategory(_) => "feeds-by-category",
            Route::SingleCategory => "single-category",
            Route::CategoryCollection => "categories",
            Route::FeedsCategories => "feeds-categories",
            Route::EntriesTags => "entries-tags",
            Route::Root => "root",
            Route::Unmatched => "unmatched",
        }
    }
}

/// Matches addresses against the routing table for one authority.
#[derive(Debug, Clone)]
pub struct Router {
    authority: String,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHORITY)
    }
}

impl Router {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Resolve an address to its route.
    ///
    /// Bare paths are accepted as belonging to this authority; qualified
    /// addresses naming another authority never match.
    pub fn resolve(&self, address: &ResourceAddress) -> Route {
        if let Some(authority) = address.authority() {
            if authority != self.authority {
                return Route::Unmatched;
            }
        }

        let segments: Vec<&str> = address.segments().iter().map(String::as_str).collect();
        match segments.as_slice() {
            [] => Route::Root,
            [contract::entries::TABLE] => Route::EntryCollection,
            [contract::entries::TABLE, id] if is_row_id(id) => Route::SingleEntry,
            [contract::feeds::TABLE] => Route::FeedCollection,
            [contract::feeds::TABLE, id] if is_row_id(id) => Route::SingleFeed,
            [contract::feeds_by_category::VIEW, category_id] => {
                Route::FeedsByCategory((*category_id).to_string())
            }
            [contract::categories::TABLE] => Route::CategoryCollection,
            [contract::categories::TABLE, id] if is_row_id(id) => Route::SingleCategory,
            [contract::feeds_categories::TABLE] => Route::FeedsCategories,
            [contract::entries_tags::TABLE] => Route::EntriesTags,
            _ => Route::Unmatched,
        }
    }
}

fn is_row_id(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(address: &str) -> Route {
        Router::default().resolve(&ResourceAddress::parse(address).unwrap())
    }

    #[test]
    fn test_collections() {
        assert_eq!(resolve("entries"), Route::EntryCollection);
        assert_eq!(resolve("feeds"), Route::FeedCollection);
        assert_eq!(resolve("categories"), Route::CategoryCollection);
        assert_eq!(resolve("feeds_categories"), Route::FeedsCategories);
        assert_eq!(resolve("entries_tags"), Route::EntriesTags);
    }

    #[test]
    fn test_single_records_need_numeric_ids() {
        assert_eq!(resolve("entries/42"), Route::SingleEntry);
        assert_eq!(resolve("feeds/1"), Route::SingleFeed);
        assert_eq!(resolve("categories/3"), Route::SingleCategory);
        assert_eq!(resolve("feeds/abc"), Route::Unmatched);
        assert_eq!(resolve("entries/-1"), Route::Unmatched);
    }

    #[test]
    fn test_feeds_by_category_takes_any_segment() {
        assert_eq!(
            resolve("feeds_by_category/c1"),
            Route::FeedsByCategory("c1".to_string())
        );
        assert_eq!(
            resolve("feeds_by_category/user%2F1%2Fcategory%2Fnews"),
            Route::FeedsByCategory("user/1/category/news".to_string())
        );
        assert_eq!(resolve("feeds_by_category"), Route::Unmatched);
        assert_eq!(resolve("feeds_by_category/c1/extra"), Route::Unmatched);
    }

    #[test]
    fn test_root_and_unmatched() {
        assert_eq!(resolve(""), Route::Root);
        assert_eq!(resolve("content://feedly.cache/"), Route::Root);
        assert_eq!(resolve("tags"), Route::Unmatched);
        assert_eq!(resolve("feeds_categories/1"), Route::Unmatched);
        assert_eq!(resolve("content://other.app/feeds"), Route::Unmatched);
    }

    #[test]
    fn test_conflict_policies() {
        assert_eq!(
            Route::FeedCollection.conflict_policy(),
            Some(ConflictPolicy::Replace)
        );
        assert_eq!(
            Route::EntriesTags.conflict_policy(),
            Some(ConflictPolicy::Ignore)
        );
        assert_eq!(Route::SingleFeed.conflict_policy(), None);
        assert_eq!(
            Route::FeedsByCategory("c1".to_string()).conflict_policy(),
            None
        );
    }
}

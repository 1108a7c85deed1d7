//! Table and column names shared by the schema, the router and callers.
//!
//! Records handed to the cache use these column names as payload keys.

/// Alias under which the storage row identifier is exposed in list views.
pub const SYNTHETIC_ID: &str = "_id";

/// Row identifier reported when an ignore-on-conflict insert was a no-op.
pub const IGNORED_ROW_ID: i64 = -1;

pub mod feeds {
    pub const TABLE: &str = "feeds";
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const URL: &str = "url";
    pub const WEBSITE: &str = "website";
    pub const ICON_URL: &str = "icon_url";
    pub const VELOCITY: &str = "velocity";
    pub const SUBSCRIBERS: &str = "subscribers";
    pub const UPDATED: &str = "updated";
    pub const STATE: &str = "state";

    /// Every stored feed column, in table order
    pub const COLUMNS: &[&str] = &[
        ID,
        TITLE,
        URL,
        WEBSITE,
        ICON_URL,
        VELOCITY,
        SUBSCRIBERS,
        UPDATED,
        STATE,
    ];
}

pub mod categories {
    pub const TABLE: &str = "categories";
    pub const ID: &str = "id";
    pub const LABEL: &str = "label";

    /// Sources the user promoted to must-read.
    pub const MUST: &str = "global.must";
    /// Every article from every subscribed source.
    pub const ALL: &str = "global.all";
    /// Articles from subscribed sources that belong to no category.
    pub const UNCATEGORIZED: &str = "global.uncategorized";
}

pub mod entries {
    pub const TABLE: &str = "entries";
    pub const ID: &str = "id";
    pub const ORIGIN_ID: &str = "origin_id";
    pub const TITLE: &str = "title";
    pub const AUTHOR: &str = "author";
    pub const URL: &str = "url";
    pub const PUBLISHED: &str = "published";
    pub const CRAWLED: &str = "crawled";
    pub const UPDATED: &str = "updated";
    pub const CONTENT: &str = "content";
    pub const SUMMARY: &str = "summary";
    pub const UNREAD: &str = "unread";
    pub const STARRED: &str = "starred";
}

pub mod feeds_categories {
    pub const TABLE: &str = "feeds_categories";
    pub const FEED_ID: &str = "feed_id";
    pub const CATEGORY_ID: &str = "category_id";
}

pub mod entries_tags {
    pub const TABLE: &str = "entries_tags";
    pub const ENTRY_ID: &str = "entry_id";
    pub const TAG: &str = "tag";
}

/// Derived view: feeds joined through `feeds_categories`.
pub mod feeds_by_category {
    pub const VIEW: &str = "feeds_by_category";
    pub const CATEGORY_ID: &str = "category_id";
    /// Views carry no rowid; the joined feed's rowid is exposed under this name.
    pub const FEED_ROWID: &str = "feed_rowid";
}

/// How an insert resolves a clash on a primary or composite key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Delete the existing row and write the new one (last writer wins).
    Replace,
    /// Keep the existing row; the insert becomes a no-op.
    Ignore,
}

impl ConflictPolicy {
    /// The `INSERT OR ...` clause for this policy
    pub fn as_sql(&self) -> &'static str {
        match self {
            ConflictPolicy::Replace => "OR REPLACE",
            ConflictPolicy::Ignore => "OR IGNORE",
        }
    }
}

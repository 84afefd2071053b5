use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::platform::{PlatformFilter, PlatformTag};

/// Represents a saved bookmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub source: PlatformTag,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_at: Option<DateTime<Utc>>,
}

/// Fields supplied when creating a bookmark. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub source: PlatformTag,
    pub tags: Vec<String>,
    pub user_id: String,
    pub reminder_at: Option<DateTime<Utc>>,
}

/// Partial update. `None` and empty strings leave the stored value untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BookmarkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub source: Option<PlatformTag>,
    pub tags: Option<Vec<String>>,
}

/// Listing criteria for the dashboard view.
#[derive(Debug, Clone, Default)]
pub struct BookmarkQuery {
    pub platform: PlatformFilter,
    pub search: Option<String>,
}

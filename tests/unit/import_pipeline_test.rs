//! Tests for the import pipeline: parsing, metadata completion and
//! per-draft persistence with partial failures.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use linkshelf::database::Database;
use linkshelf::managers::bookmark_manager::{BookmarkManager, BookmarkStore};
use linkshelf::services::import_export::import_bookmarks;
use linkshelf::services::metadata_resolver::MetadataSource;
use linkshelf::types::bookmark::{Bookmark, BookmarkPatch, BookmarkQuery, NewBookmark};
use linkshelf::types::errors::BookmarkError;
use linkshelf::types::metadata::MetadataResult;
use linkshelf::types::platform::PlatformTag;

const USER: &str = "user-0000000001";

/// Returns a fixed title per URL and records which URLs were looked up.
#[derive(Default)]
struct CannedMetadata {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl MetadataSource for CannedMetadata {
    async fn resolve(&self, url: &str) -> MetadataResult {
        self.calls.lock().unwrap().push(url.to_string());
        MetadataResult::new(format!("Fetched {}", url), "fetched description", "")
    }
}

/// In-memory store that rejects the n-th create call (1-based).
struct FlakyStore {
    fail_on: usize,
    calls: usize,
    saved: Vec<NewBookmark>,
}

impl FlakyStore {
    fn failing_on(fail_on: usize) -> Self {
        Self { fail_on, calls: 0, saved: Vec::new() }
    }
}

impl BookmarkStore for FlakyStore {
    fn create_bookmark(&mut self, bookmark: NewBookmark) -> Result<Bookmark, BookmarkError> {
        self.calls += 1;
        if self.calls == self.fail_on {
            return Err(BookmarkError::DatabaseError("disk full".to_string()));
        }
        self.saved.push(bookmark.clone());
        Ok(Bookmark {
            id: format!("bm-{}", self.calls),
            title: bookmark.title,
            url: bookmark.url,
            description: bookmark.description,
            thumbnail: bookmark.thumbnail,
            source: bookmark.source,
            tags: bookmark.tags,
            created_at: Utc::now(),
            user_id: bookmark.user_id,
            reminder_at: bookmark.reminder_at,
        })
    }
    fn update_bookmark(&mut self, id: &str, _: BookmarkPatch) -> Result<Bookmark, BookmarkError> {
        Err(BookmarkError::NotFound(id.to_string()))
    }
    fn delete_bookmark(&mut self, id: &str) -> Result<(), BookmarkError> {
        Err(BookmarkError::NotFound(id.to_string()))
    }
    fn get_bookmark(&self, id: &str) -> Result<Bookmark, BookmarkError> {
        Err(BookmarkError::NotFound(id.to_string()))
    }
    fn list_bookmarks(&self, _: &str) -> Result<Vec<Bookmark>, BookmarkError> {
        Ok(Vec::new())
    }
    fn query_bookmarks(&self, _: &str, _: &BookmarkQuery) -> Result<Vec<Bookmark>, BookmarkError> {
        Ok(Vec::new())
    }
    fn set_reminder(&mut self, id: &str, _: Option<DateTime<Utc>>) -> Result<Bookmark, BookmarkError> {
        Err(BookmarkError::NotFound(id.to_string()))
    }
    fn due_reminders(&self, _: &str, _: DateTime<Utc>) -> Result<Vec<Bookmark>, BookmarkError> {
        Ok(Vec::new())
    }
    fn seed_default_bookmarks(&mut self, _: &str) -> Result<usize, BookmarkError> {
        Ok(0)
    }
    fn delete_default_bookmarks(&mut self, _: &str) -> Result<usize, BookmarkError> {
        Ok(0)
    }
    fn should_offer_default_cleanup(&self, _: &str) -> Result<bool, BookmarkError> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_failing_draft_does_not_stop_the_rest() {
    let metadata = CannedMetadata::default();
    let mut store = FlakyStore::failing_on(2);

    let summary = import_bookmarks(
        "https://a.io\nhttps://b.io\nhttps://c.io",
        USER,
        &metadata,
        &mut store,
    )
    .await;

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].index, 1);
    assert_eq!(summary.failures[0].url.as_deref(), Some("https://b.io"));
    assert!(summary.failures[0].reason.contains("disk full"));
    assert_eq!(
        store.saved.iter().map(|b| b.url.as_str()).collect::<Vec<_>>(),
        vec!["https://a.io", "https://c.io"]
    );
}

#[tokio::test]
async fn test_only_untitled_drafts_are_resolved() {
    let metadata = CannedMetadata::default();
    let mut store = FlakyStore::failing_on(0);

    let summary = import_bookmarks(
        r#"[{"url": "https://a.io", "title": "Given"}, {"url": "https://b.io", "description": "kept"}]"#,
        USER,
        &metadata,
        &mut store,
    )
    .await;

    assert_eq!(summary.succeeded, 2);
    assert_eq!(*metadata.calls.lock().unwrap(), vec!["https://b.io".to_string()]);
    assert_eq!(store.saved[0].title, "Given");
    assert_eq!(store.saved[1].title, "Fetched https://b.io");
    assert_eq!(store.saved[1].description.as_deref(), Some("kept"));
}

#[tokio::test]
async fn test_drafts_without_url_count_as_failures() {
    let metadata = CannedMetadata::default();
    let mut store = FlakyStore::failing_on(0);

    let summary = import_bookmarks(
        r#"[{"title": "No link"}, {"url": "https://a.io", "title": "A"}]"#,
        USER,
        &metadata,
        &mut store,
    )
    .await;

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failures[0].index, 0);
    assert_eq!(summary.failures[0].url, None);
    assert!(metadata.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_payload_imports_nothing() {
    let metadata = CannedMetadata::default();
    let mut store = FlakyStore::failing_on(0);
    let summary = import_bookmarks("   ", USER, &metadata, &mut store).await;
    assert_eq!(summary.attempted, 0);
    assert_eq!(summary.succeeded, 0);
}

#[tokio::test]
async fn test_imports_into_sqlite_store() {
    let db = Database::open_in_memory().unwrap();
    let mut store = BookmarkManager::new(db.connection());
    let metadata = CannedMetadata::default();

    let summary = import_bookmarks(
        "Title,URL,Description,Source\nClip,https://youtu.be/abc,,youtube\nBad,notaurl,,\n",
        USER,
        &metadata,
        &mut store,
    )
    .await;

    assert_eq!((summary.succeeded, summary.attempted), (1, 2));
    let saved = store.list_bookmarks(USER).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].source, PlatformTag::Youtube);
    assert!(summary.failures[0].reason.contains("notaurl"));
}

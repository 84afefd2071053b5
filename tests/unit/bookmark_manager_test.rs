//! Unit tests for the BookmarkManager public API.
//!
//! These tests exercise the `BookmarkStore` interface against an in-memory
//! SQLite database: CRUD, search, platform filtering, reminders and the
//! example bookmarks offered to new users.

use chrono::{Duration, Utc};

use linkshelf::database::Database;
use linkshelf::managers::bookmark_manager::{BookmarkManager, BookmarkStore};
use linkshelf::types::bookmark::{BookmarkPatch, BookmarkQuery, NewBookmark};
use linkshelf::types::errors::BookmarkError;
use linkshelf::types::platform::{PlatformFilter, PlatformTag};

const USER: &str = "user-0000000001";

fn new_bookmark(title: &str, url: &str, source: PlatformTag) -> NewBookmark {
    NewBookmark {
        title: title.to_string(),
        url: url.to_string(),
        source,
        user_id: USER.to_string(),
        ..NewBookmark::default()
    }
}

#[test]
fn test_create_then_get_round_trips() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());

    let created = mgr
        .create_bookmark(NewBookmark {
            description: Some("Docs".to_string()),
            tags: vec!["rust".to_string(), " rust ".to_string(), "".to_string()],
            ..new_bookmark("  Rust  ", " https://rust-lang.org ", PlatformTag::Others)
        })
        .unwrap();

    assert_eq!(created.title, "Rust");
    assert_eq!(created.url, "https://rust-lang.org");
    assert_eq!(created.tags, vec!["rust".to_string()]);

    let fetched = mgr.get_bookmark(&created.id).unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn test_create_validates_input() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());

    let err = mgr
        .create_bookmark(new_bookmark("", "https://a.io", PlatformTag::Others))
        .unwrap_err();
    assert!(matches!(err, BookmarkError::MissingField(_)));

    let err = mgr
        .create_bookmark(new_bookmark("A", "ftp://a.io", PlatformTag::Others))
        .unwrap_err();
    assert!(matches!(err, BookmarkError::InvalidUrl(_)));

    let err = mgr
        .create_bookmark(NewBookmark {
            user_id: "short".to_string(),
            ..new_bookmark("A", "https://a.io", PlatformTag::Others)
        })
        .unwrap_err();
    assert!(matches!(err, BookmarkError::InvalidUserId(_)));
}

#[test]
fn test_update_applies_only_present_fields() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());
    let created = mgr
        .create_bookmark(new_bookmark("Old", "https://x.com/post/1", PlatformTag::Twitter))
        .unwrap();

    let updated = mgr
        .update_bookmark(
            &created.id,
            BookmarkPatch {
                title: Some("New".to_string()),
                description: Some("   ".to_string()),
                tags: Some(vec!["news".to_string()]),
                ..BookmarkPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.title, "New");
    assert_eq!(updated.url, created.url);
    assert_eq!(updated.description, None);
    assert_eq!(updated.source, PlatformTag::Twitter);
    assert_eq!(updated.tags, vec!["news".to_string()]);
}

#[test]
fn test_update_and_delete_missing_bookmark() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());

    let err = mgr
        .update_bookmark("missing", BookmarkPatch { title: Some("x".into()), ..BookmarkPatch::default() })
        .unwrap_err();
    assert!(matches!(err, BookmarkError::NotFound(_)));
    assert!(matches!(mgr.delete_bookmark("missing"), Err(BookmarkError::NotFound(_))));
    assert!(matches!(mgr.get_bookmark("missing"), Err(BookmarkError::NotFound(_))));
}

#[test]
fn test_delete_removes_bookmark() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());
    let created = mgr
        .create_bookmark(new_bookmark("A", "https://a.io", PlatformTag::Others))
        .unwrap();

    mgr.delete_bookmark(&created.id).unwrap();
    assert!(mgr.list_bookmarks(USER).unwrap().is_empty());
}

#[test]
fn test_list_is_newest_first_and_scoped_to_user() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());
    mgr.create_bookmark(new_bookmark("First", "https://a.io", PlatformTag::Others)).unwrap();
    mgr.create_bookmark(new_bookmark("Second", "https://b.io", PlatformTag::Others)).unwrap();
    mgr.create_bookmark(NewBookmark {
        user_id: "someone-else-42".to_string(),
        ..new_bookmark("Foreign", "https://c.io", PlatformTag::Others)
    })
    .unwrap();

    let titles: Vec<String> = mgr
        .list_bookmarks(USER)
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, vec!["Second".to_string(), "First".to_string()]);
}

#[test]
fn test_query_filters_platform_and_searches_tags() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());
    mgr.create_bookmark(NewBookmark {
        tags: vec!["GraphQL".to_string()],
        ..new_bookmark("Talk", "https://youtu.be/abc", PlatformTag::Youtube)
    })
    .unwrap();
    mgr.create_bookmark(NewBookmark {
        description: Some("graphql thread".to_string()),
        ..new_bookmark("Thread", "https://x.com/a/status/1", PlatformTag::Twitter)
    })
    .unwrap();
    mgr.create_bookmark(new_bookmark("100% off_sale", "https://shop.io", PlatformTag::Others))
        .unwrap();

    let search = |platform, term: &str| {
        mgr.query_bookmarks(
            USER,
            &BookmarkQuery {
                platform,
                search: Some(term.to_string()),
            },
        )
        .unwrap()
        .len()
    };

    assert_eq!(search(PlatformFilter::All, "graphql"), 2);
    assert_eq!(search(PlatformFilter::Platform(PlatformTag::Youtube), "graphql"), 1);
    assert_eq!(search(PlatformFilter::Platform(PlatformTag::Reddit), "graphql"), 0);
    // Wildcard characters in the term are literal.
    assert_eq!(search(PlatformFilter::All, "100%"), 1);
    assert_eq!(search(PlatformFilter::All, "f_s"), 1);
    assert_eq!(search(PlatformFilter::All, "%"), 1);
}

#[test]
fn test_search_ignores_tag_encoding_and_folds_unicode_case() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());
    mgr.create_bookmark(NewBookmark {
        tags: vec!["rust".to_string(), "web".to_string()],
        ..new_bookmark("Plain", "https://plain.example.com", PlatformTag::Others)
    })
    .unwrap();
    mgr.create_bookmark(new_bookmark("École Normale", "https://ens.fr", PlatformTag::Others))
        .unwrap();

    let titles = |term: &str| -> Vec<String> {
        mgr.query_bookmarks(
            USER,
            &BookmarkQuery {
                platform: PlatformFilter::All,
                search: Some(term.to_string()),
            },
        )
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect()
    };

    assert!(titles("\",\"").is_empty());
    assert!(titles("\"").is_empty());
    assert!(titles("[").is_empty());
    assert_eq!(titles("école"), vec!["École Normale".to_string()]);
    assert_eq!(titles("ÉCOLE"), vec!["École Normale".to_string()]);
    assert_eq!(titles("WEB"), vec!["Plain".to_string()]);
}

#[test]
fn test_reminders() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());
    let created = mgr
        .create_bookmark(new_bookmark("Later", "https://a.io", PlatformTag::Others))
        .unwrap();

    let past = Utc::now() - Duration::hours(1);
    assert!(matches!(
        mgr.set_reminder(&created.id, Some(past)),
        Err(BookmarkError::InvalidReminder(_))
    ));

    let soon = Utc::now() + Duration::hours(1);
    let with_reminder = mgr.set_reminder(&created.id, Some(soon)).unwrap();
    assert!(with_reminder.reminder_at.is_some());

    assert!(mgr.due_reminders(USER, Utc::now()).unwrap().is_empty());
    let due = mgr.due_reminders(USER, soon + Duration::minutes(1)).unwrap();
    assert_eq!(due.len(), 1);

    let cleared = mgr.set_reminder(&created.id, None).unwrap();
    assert_eq!(cleared.reminder_at, None);
    assert!(mgr.due_reminders(USER, soon + Duration::minutes(1)).unwrap().is_empty());
}

#[test]
fn test_default_bookmarks_lifecycle() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());

    let seeded = mgr.seed_default_bookmarks(USER).unwrap();
    assert_eq!(seeded, 5);
    assert_eq!(mgr.seed_default_bookmarks(USER).unwrap(), 0, "seeding twice is a no-op");
    assert!(!mgr.should_offer_default_cleanup(USER).unwrap());

    mgr.create_bookmark(new_bookmark("Mine", "https://mine.io", PlatformTag::Others))
        .unwrap();
    assert!(mgr.should_offer_default_cleanup(USER).unwrap());

    mgr.create_bookmark(new_bookmark("Mine 2", "https://mine2.io", PlatformTag::Others))
        .unwrap();
    assert!(!mgr.should_offer_default_cleanup(USER).unwrap());

    assert_eq!(mgr.delete_default_bookmarks(USER).unwrap(), 5);
    let left = mgr.list_bookmarks(USER).unwrap();
    assert_eq!(left.len(), 2);
    assert!(!mgr.should_offer_default_cleanup(USER).unwrap());
}

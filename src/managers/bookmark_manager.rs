//! Bookmark store for linkshelf.
//!
//! Implements `BookmarkStore`: CRUD, search, platform filtering, reminders and
//! the example bookmarks shown to new users, backed by SQLite via `rusqlite`.

use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use crate::types::bookmark::{Bookmark, BookmarkPatch, BookmarkQuery, NewBookmark};
use crate::types::errors::BookmarkError;
use crate::types::platform::{PlatformFilter, PlatformTag};

/// Shortest user ID the store accepts.
pub const MIN_USER_ID_LEN: usize = 10;

const SELECT_COLUMNS: &str =
    "SELECT id, title, url, description, thumbnail, source, tags, user_id, created_at, reminder_at FROM bookmarks";

/// Record store operations the rest of the crate persists through.
pub trait BookmarkStore {
    fn create_bookmark(&mut self, bookmark: NewBookmark) -> Result<Bookmark, BookmarkError>;
    fn update_bookmark(&mut self, id: &str, patch: BookmarkPatch) -> Result<Bookmark, BookmarkError>;
    fn delete_bookmark(&mut self, id: &str) -> Result<(), BookmarkError>;
    fn get_bookmark(&self, id: &str) -> Result<Bookmark, BookmarkError>;
    /// All bookmarks of a user, newest first.
    fn list_bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>, BookmarkError>;
    fn query_bookmarks(&self, user_id: &str, query: &BookmarkQuery) -> Result<Vec<Bookmark>, BookmarkError>;
    /// Sets (`Some`) or clears (`None`) a reminder. Past dates are rejected.
    fn set_reminder(&mut self, id: &str, at: Option<DateTime<Utc>>) -> Result<Bookmark, BookmarkError>;
    fn due_reminders(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Bookmark>, BookmarkError>;
    fn seed_default_bookmarks(&mut self, user_id: &str) -> Result<usize, BookmarkError>;
    fn delete_default_bookmarks(&mut self, user_id: &str) -> Result<usize, BookmarkError>;
    fn should_offer_default_cleanup(&self, user_id: &str) -> Result<bool, BookmarkError>;
}

/// Example bookmarks inserted for a brand-new shelf: (title, url, description, source, tags).
const DEFAULT_BOOKMARKS: &[(&str, &str, &str, PlatformTag, &[&str])] = &[
    (
        "Getting Started with React",
        "https://react.dev/learn",
        "Learn the basics of React from the official documentation",
        PlatformTag::Twitter,
        &["react", "javascript", "web-development"],
    ),
    (
        "The Rust Programming Language",
        "https://doc.rust-lang.org/book/",
        "The official book on the Rust programming language",
        PlatformTag::Reddit,
        &["rust", "programming"],
    ),
    (
        "Tailwind CSS Tutorial",
        "https://tailwindcss.com/docs/installation",
        "Learn how to use Tailwind CSS to build beautiful UIs",
        PlatformTag::Instagram,
        &["css", "tailwind", "web-design"],
    ),
    (
        "Building Accessible Web Applications",
        "https://www.w3.org/WAI/fundamentals/accessibility-intro/",
        "Best practices for building accessible web applications",
        PlatformTag::Linkedin,
        &["accessibility", "web-development", "a11y"],
    ),
    (
        "Introduction to GraphQL",
        "https://www.youtube.com/watch?v=eIQh02xuVw4",
        "Learn the basics of GraphQL and how it differs from REST",
        PlatformTag::Youtube,
        &["graphql", "api"],
    ),
];

/// Bookmark store backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Reads a single `Bookmark` row into a struct.
    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        let source: String = row.get(5)?;
        let tags_json: String = row.get(6)?;
        let tags: Vec<String> = serde_json::from_str(&tags_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;
        Ok(Bookmark {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            description: row.get(3)?,
            thumbnail: row.get(4)?,
            source: PlatformTag::from_label_lossy(&source),
            tags,
            user_id: row.get(7)?,
            created_at: row.get(8)?,
            reminder_at: row.get(9)?,
        })
    }

    fn collect(&self, sql: &str, values: Vec<Value>) -> Result<Vec<Bookmark>, BookmarkError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(values), Self::row_to_bookmark)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn insert(&self, bookmark: NewBookmark, is_default: bool) -> Result<Bookmark, BookmarkError> {
        let title = bookmark.title.trim().to_string();
        if title.is_empty() {
            return Err(BookmarkError::MissingField("title".to_string()));
        }
        let url = validate_url(&bookmark.url)?;
        validate_user_id(&bookmark.user_id)?;

        let record = Bookmark {
            id: Uuid::new_v4().to_string(),
            title,
            url,
            description: non_empty(bookmark.description),
            thumbnail: non_empty(bookmark.thumbnail),
            source: bookmark.source,
            tags: normalize_tags(bookmark.tags),
            created_at: Utc::now(),
            user_id: bookmark.user_id,
            reminder_at: bookmark.reminder_at,
        };
        let tags_json = tags_to_json(&record.tags)?;

        self.conn.execute(
            "INSERT INTO bookmarks (id, title, url, description, thumbnail, source, tags, user_id, created_at, reminder_at, is_default) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.id,
                record.title,
                record.url,
                record.description,
                record.thumbnail,
                record.source.as_str(),
                tags_json,
                record.user_id,
                record.created_at,
                record.reminder_at,
                is_default,
            ],
        )?;

        Ok(record)
    }

    fn count(&self, sql: &str, user_id: &str) -> Result<i64, BookmarkError> {
        Ok(self.conn.query_row(sql, params![user_id], |row| row.get(0))?)
    }
}

impl<'a> BookmarkStore for BookmarkManager<'a> {
    fn create_bookmark(&mut self, bookmark: NewBookmark) -> Result<Bookmark, BookmarkError> {
        let created = self.insert(bookmark, false)?;
        tracing::debug!(id = %created.id, url = %created.url, "bookmark created");
        Ok(created)
    }

    /// Applies the present, non-empty fields of `patch`.
    fn update_bookmark(&mut self, id: &str, patch: BookmarkPatch) -> Result<Bookmark, BookmarkError> {
        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(title) = non_empty(patch.title) {
            assignments.push("title = ?");
            values.push(Value::Text(title));
        }
        if let Some(url) = non_empty(patch.url) {
            assignments.push("url = ?");
            values.push(Value::Text(validate_url(&url)?));
        }
        if let Some(description) = non_empty(patch.description) {
            assignments.push("description = ?");
            values.push(Value::Text(description));
        }
        if let Some(thumbnail) = non_empty(patch.thumbnail) {
            assignments.push("thumbnail = ?");
            values.push(Value::Text(thumbnail));
        }
        if let Some(source) = patch.source {
            assignments.push("source = ?");
            values.push(Value::Text(source.as_str().to_string()));
        }
        if let Some(tags) = patch.tags {
            assignments.push("tags = ?");
            values.push(Value::Text(tags_to_json(&normalize_tags(tags))?));
        }

        if assignments.is_empty() {
            // Nothing to write, still report a missing row.
            return self.get_bookmark(id);
        }

        let sql = format!("UPDATE bookmarks SET {} WHERE id = ?", assignments.join(", "));
        values.push(Value::Text(id.to_string()));
        let affected = self.conn.execute(&sql, params_from_iter(values))?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        self.get_bookmark(id)
    }

    fn delete_bookmark(&mut self, id: &str) -> Result<(), BookmarkError> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])?;

        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn get_bookmark(&self, id: &str) -> Result<Bookmark, BookmarkError> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        match self.conn.query_row(&sql, params![id], Self::row_to_bookmark) {
            Ok(bookmark) => Ok(bookmark),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(BookmarkError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn list_bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>, BookmarkError> {
        self.query_bookmarks(user_id, &BookmarkQuery::default())
    }

    /// Filters by platform and by a case-insensitive substring of title, description or tags.
    fn query_bookmarks(&self, user_id: &str, query: &BookmarkQuery) -> Result<Vec<Bookmark>, BookmarkError> {
        let mut sql = format!("{} WHERE user_id = ?", SELECT_COLUMNS);
        let mut values = vec![Value::Text(user_id.to_string())];

        if let PlatformFilter::Platform(tag) = query.platform {
            sql.push_str(" AND source = ?");
            values.push(Value::Text(tag.as_str().to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, rowid DESC");
        let rows = self.collect(&sql, values)?;

        match query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(search) => {
                let needle = search.to_lowercase();
                Ok(rows.into_iter().filter(|b| matches_search(b, &needle)).collect())
            }
            None => Ok(rows),
        }
    }

    fn set_reminder(&mut self, id: &str, at: Option<DateTime<Utc>>) -> Result<Bookmark, BookmarkError> {
        if let Some(when) = at {
            if when <= Utc::now() {
                return Err(BookmarkError::InvalidReminder(format!(
                    "{} is not in the future",
                    when.to_rfc3339()
                )));
            }
        }

        let affected = self.conn.execute(
            "UPDATE bookmarks SET reminder_at = ?1 WHERE id = ?2",
            params![at, id],
        )?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        self.get_bookmark(id)
    }

    fn due_reminders(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Bookmark>, BookmarkError> {
        let sql = format!(
            "{} WHERE user_id = ? AND reminder_at IS NOT NULL AND reminder_at <= ? ORDER BY reminder_at",
            SELECT_COLUMNS
        );
        let due = self.collect(&sql, vec![Value::Text(user_id.to_string()), Value::Text(sql_timestamp(now))])?;
        Ok(due)
    }

    /// Inserts the example bookmarks, but only into an empty shelf.
    fn seed_default_bookmarks(&mut self, user_id: &str) -> Result<usize, BookmarkError> {
        validate_user_id(user_id)?;
        if self.count("SELECT COUNT(*) FROM bookmarks WHERE user_id = ?1", user_id)? > 0 {
            return Ok(0);
        }

        for (title, url, description, source, tags) in DEFAULT_BOOKMARKS {
            self.insert(
                NewBookmark {
                    title: title.to_string(),
                    url: url.to_string(),
                    description: Some(description.to_string()),
                    source: *source,
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                    user_id: user_id.to_string(),
                    ..NewBookmark::default()
                },
                true,
            )?;
        }
        tracing::info!(user_id, count = DEFAULT_BOOKMARKS.len(), "seeded example bookmarks");
        Ok(DEFAULT_BOOKMARKS.len())
    }

    fn delete_default_bookmarks(&mut self, user_id: &str) -> Result<usize, BookmarkError> {
        let affected = self.conn.execute(
            "DELETE FROM bookmarks WHERE user_id = ?1 AND is_default = 1",
            params![user_id],
        )?;
        Ok(affected)
    }

    /// True right after the user's first own bookmark while the examples are still there.
    fn should_offer_default_cleanup(&self, user_id: &str) -> Result<bool, BookmarkError> {
        let defaults = self.count(
            "SELECT COUNT(*) FROM bookmarks WHERE user_id = ?1 AND is_default = 1",
            user_id,
        )?;
        let own = self.count(
            "SELECT COUNT(*) FROM bookmarks WHERE user_id = ?1 AND is_default = 0",
            user_id,
        )?;
        Ok(defaults > 0 && own == 1)
    }
}

/// Trims and checks that `raw` is an absolute http(s) URL.
pub fn validate_url(raw: &str) -> Result<String, BookmarkError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BookmarkError::MissingField("url".to_string()));
    }
    let parsed = url::Url::parse(trimmed).map_err(|_| BookmarkError::InvalidUrl(trimmed.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(BookmarkError::InvalidUrl(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn validate_user_id(user_id: &str) -> Result<(), BookmarkError> {
    if user_id.trim().len() < MIN_USER_ID_LEN {
        return Err(BookmarkError::InvalidUserId(user_id.to_string()));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

fn tags_to_json(tags: &[String]) -> Result<String, BookmarkError> {
    serde_json::to_string(tags).map_err(|e| BookmarkError::DatabaseError(e.to_string()))
}

/// Case-insensitive substring match over title, description and each tag.
/// `needle` must already be lower-cased.
fn matches_search(bookmark: &Bookmark, needle: &str) -> bool {
    bookmark.title.to_lowercase().contains(needle)
        || bookmark
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || bookmark.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// Same text layout rusqlite uses when binding a `DateTime<Utc>`, so string comparison orders correctly.
fn sql_timestamp(at: DateTime<Utc>) -> String {
    at.format("%F %T%.f%:z").to_string()
}

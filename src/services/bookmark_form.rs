//! Add/edit form state for a single bookmark.
//!
//! Keeps the platform in sync with the URL, takes in fetched metadata and
//! produces store inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::managers::bookmark_manager::{validate_url, validate_user_id};
use crate::services::import_export::split_tags;
use crate::services::platform_classifier::classify_url;
use crate::types::bookmark::{Bookmark, BookmarkPatch, NewBookmark};
use crate::types::errors::BookmarkError;
use crate::types::metadata::MetadataResult;
use crate::types::platform::PlatformTag;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookmarkForm {
    pub url: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub source: PlatformTag,
    /// Raw comma-separated tag input.
    pub tags_input: String,
    pub reminder_at: Option<DateTime<Utc>>,
}

impl BookmarkForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fills the form for editing an existing bookmark.
    pub fn from_bookmark(bookmark: &Bookmark) -> Self {
        Self {
            url: bookmark.url.clone(),
            title: bookmark.title.clone(),
            description: bookmark.description.clone().unwrap_or_default(),
            thumbnail: bookmark.thumbnail.clone().unwrap_or_default(),
            source: bookmark.source,
            tags_input: bookmark.tags.join(", "),
            reminder_at: bookmark.reminder_at,
        }
    }

    /// Stores the URL and re-derives the platform, replacing any manual choice.
    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
        self.source = classify_url(url);
    }

    pub fn set_source(&mut self, source: PlatformTag) {
        self.source = source;
    }

    /// Metadata is only looked up for new bookmarks with an http(s)-looking URL.
    pub fn should_fetch_metadata(&self, is_edit: bool) -> bool {
        !is_edit && self.url.trim_start().starts_with("http")
    }

    /// Fetched title and description replace what the form holds; the
    /// thumbnail only fills an empty slot. Empty fetched values change nothing.
    /// Returns whether anything was applied.
    pub fn apply_metadata(&mut self, metadata: &MetadataResult) -> bool {
        let mut applied = false;
        for (slot, value) in [(&mut self.title, &metadata.title), (&mut self.description, &metadata.description)] {
            if !value.trim().is_empty() {
                *slot = value.clone();
                applied = true;
            }
        }
        if self.thumbnail.trim().is_empty() && !metadata.thumbnail.is_empty() {
            self.thumbnail = metadata.thumbnail.clone();
            applied = true;
        }
        applied
    }

    pub fn parsed_tags(&self) -> Vec<String> {
        split_tags(&self.tags_input)
    }

    pub fn validate(&self) -> Result<(), BookmarkError> {
        validate_url(&self.url)?;
        if self.title.trim().is_empty() {
            return Err(BookmarkError::MissingField("title".to_string()));
        }
        Ok(())
    }

    pub fn to_new_bookmark(&self, user_id: &str) -> Result<NewBookmark, BookmarkError> {
        self.validate()?;
        validate_user_id(user_id)?;
        Ok(NewBookmark {
            title: self.title.trim().to_string(),
            url: self.url.trim().to_string(),
            description: optional(&self.description),
            thumbnail: optional(&self.thumbnail),
            source: self.source,
            tags: self.parsed_tags(),
            user_id: user_id.to_string(),
            reminder_at: self.reminder_at,
        })
    }

    pub fn to_patch(&self) -> Result<BookmarkPatch, BookmarkError> {
        self.validate()?;
        Ok(BookmarkPatch {
            title: Some(self.title.trim().to_string()),
            url: Some(self.url.trim().to_string()),
            description: optional(&self.description),
            thumbnail: optional(&self.thumbnail),
            source: Some(self.source),
            tags: Some(self.parsed_tags()),
        })
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

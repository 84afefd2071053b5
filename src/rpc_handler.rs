//! RPC method handler for the linkshelf JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches a call to the store, resolver, import/export
//! and settings services owned by [`App`].

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::app::App;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkStore};
use crate::services::bookmark_form::BookmarkForm;
use crate::services::import_export::{import_bookmarks, parse_import_payload, serialize_bookmarks, split_tags};
use crate::services::metadata_resolver::MetadataSource;
use crate::services::platform_classifier::classify_url;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::{Bookmark, BookmarkPatch, BookmarkQuery, NewBookmark};
use crate::types::errors::BookmarkError;
use crate::types::platform::{PlatformFilter, PlatformTag};
use crate::types::transfer::ExportFormat;

/// [`BookmarkStore`] that takes the app lock for each call, so the import
/// pipeline can await metadata without holding it.
struct LockedStore<'a> {
    app: &'a Mutex<App>,
}

impl LockedStore<'_> {
    fn with<T>(
        &self,
        f: impl FnOnce(&mut BookmarkManager<'_>) -> Result<T, BookmarkError>,
    ) -> Result<T, BookmarkError> {
        let app = self
            .app
            .lock()
            .map_err(|e| BookmarkError::DatabaseError(format!("app lock poisoned: {}", e)))?;
        let mut store = app.store();
        f(&mut store)
    }
}

impl BookmarkStore for LockedStore<'_> {
    fn create_bookmark(&mut self, bookmark: NewBookmark) -> Result<Bookmark, BookmarkError> {
        self.with(|s| s.create_bookmark(bookmark))
    }
    fn update_bookmark(&mut self, id: &str, patch: BookmarkPatch) -> Result<Bookmark, BookmarkError> {
        self.with(|s| s.update_bookmark(id, patch))
    }
    fn delete_bookmark(&mut self, id: &str) -> Result<(), BookmarkError> {
        self.with(|s| s.delete_bookmark(id))
    }
    fn get_bookmark(&self, id: &str) -> Result<Bookmark, BookmarkError> {
        self.with(|s| s.get_bookmark(id))
    }
    fn list_bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>, BookmarkError> {
        self.with(|s| s.list_bookmarks(user_id))
    }
    fn query_bookmarks(&self, user_id: &str, query: &BookmarkQuery) -> Result<Vec<Bookmark>, BookmarkError> {
        self.with(|s| s.query_bookmarks(user_id, query))
    }
    fn set_reminder(&mut self, id: &str, at: Option<DateTime<Utc>>) -> Result<Bookmark, BookmarkError> {
        self.with(|s| s.set_reminder(id, at))
    }
    fn due_reminders(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Bookmark>, BookmarkError> {
        self.with(|s| s.due_reminders(user_id, now))
    }
    fn seed_default_bookmarks(&mut self, user_id: &str) -> Result<usize, BookmarkError> {
        self.with(|s| s.seed_default_bookmarks(user_id))
    }
    fn delete_default_bookmarks(&mut self, user_id: &str) -> Result<usize, BookmarkError> {
        self.with(|s| s.delete_default_bookmarks(user_id))
    }
    fn should_offer_default_cleanup(&self, user_id: &str) -> Result<bool, BookmarkError> {
        self.with(|s| s.should_offer_default_cleanup(user_id))
    }
}

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn opt_str<'a>(params: &'a Value, name: &str) -> Option<&'a str> {
    params.get(name).and_then(|v| v.as_str())
}

/// Tags may arrive as an array or as a comma-separated string.
fn tags_param(params: &Value) -> Option<Vec<String>> {
    match params.get("tags")? {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect(),
        ),
        Value::String(raw) => Some(split_tags(raw)),
        _ => None,
    }
}

fn platform_param(params: &Value) -> Result<Option<PlatformTag>, String> {
    opt_str(params, "source")
        .map(|raw| raw.parse::<PlatformTag>())
        .transpose()
}

fn datetime_param(params: &Value, name: &str) -> Result<Option<DateTime<Utc>>, String> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| format!("invalid {}: {}", name, e)),
        Some(_) => Err(format!("invalid {}: expected RFC 3339 string", name)),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

fn user_id(app: &Mutex<App>) -> Result<String, String> {
    let a = app.lock().map_err(|e| e.to_string())?;
    Ok(a.user_id().to_string())
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
/// The app lock is never held across an `.await`.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    let mut store = LockedStore { app };

    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Bookmarks ───
        "bookmark.add" => {
            let mut form = BookmarkForm::new();
            form.set_url(str_param(params, "url")?);

            let title = opt_str(params, "title").unwrap_or_default();
            if title.trim().is_empty() && form.should_fetch_metadata(false) {
                let resolver = app.lock().map_err(|e| e.to_string())?.resolver.clone();
                let metadata = resolver.resolve(&form.url).await;
                form.apply_metadata(&metadata);
            }

            // Values sent with the call win over fetched ones.
            for (slot, name) in [
                (&mut form.title, "title"),
                (&mut form.description, "description"),
                (&mut form.thumbnail, "thumbnail"),
            ] {
                if let Some(value) = opt_str(params, name).filter(|v| !v.trim().is_empty()) {
                    *slot = value.to_string();
                }
            }
            if let Some(source) = platform_param(params)? {
                form.set_source(source);
            }
            if let Some(tags) = tags_param(params) {
                form.tags_input = tags.join(", ");
            }
            form.reminder_at = datetime_param(params, "reminder_at")?;

            let new = form.to_new_bookmark(&user_id(app)?).map_err(|e| e.to_string())?;
            let created = store.create_bookmark(new).map_err(|e| e.to_string())?;
            to_json(&created)
        }
        "bookmark.update" => {
            let id = str_param(params, "id")?;
            let existing = store.get_bookmark(id).map_err(|e| e.to_string())?;
            let mut form = BookmarkForm::from_bookmark(&existing);
            if let Some(url) = opt_str(params, "url") {
                form.set_url(url);
            }
            if let Some(source) = platform_param(params)? {
                form.set_source(source);
            }
            if let Some(title) = opt_str(params, "title") {
                form.title = title.to_string();
            }
            if let Some(description) = opt_str(params, "description") {
                form.description = description.to_string();
            }
            if let Some(thumbnail) = opt_str(params, "thumbnail") {
                form.thumbnail = thumbnail.to_string();
            }
            if let Some(tags) = tags_param(params) {
                form.tags_input = tags.join(", ");
            }

            let patch = form.to_patch().map_err(|e| e.to_string())?;
            let updated = store.update_bookmark(id, patch).map_err(|e| e.to_string())?;
            to_json(&updated)
        }
        "bookmark.delete" => {
            let id = str_param(params, "id")?;
            store.delete_bookmark(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmark.get" => {
            let id = str_param(params, "id")?;
            to_json(&store.get_bookmark(id).map_err(|e| e.to_string())?)
        }
        "bookmark.list" => {
            let platform: PlatformFilter = opt_str(params, "platform").unwrap_or("all").parse()?;
            let query = BookmarkQuery {
                platform,
                search: opt_str(params, "query").map(str::to_string),
            };
            let bookmarks = store
                .query_bookmarks(&user_id(app)?, &query)
                .map_err(|e| e.to_string())?;
            to_json(&bookmarks)
        }
        "bookmark.set_reminder" => {
            let id = str_param(params, "id")?;
            let at = datetime_param(params, "at")?;
            to_json(&store.set_reminder(id, at).map_err(|e| e.to_string())?)
        }
        "bookmark.due_reminders" => {
            let due = store
                .due_reminders(&user_id(app)?, Utc::now())
                .map_err(|e| e.to_string())?;
            to_json(&due)
        }
        "bookmark.seed_defaults" => {
            let inserted = store
                .seed_default_bookmarks(&user_id(app)?)
                .map_err(|e| e.to_string())?;
            Ok(json!({"inserted": inserted}))
        }
        "bookmark.delete_defaults" => {
            let deleted = store
                .delete_default_bookmarks(&user_id(app)?)
                .map_err(|e| e.to_string())?;
            Ok(json!({"deleted": deleted}))
        }
        "bookmark.offer_default_cleanup" => {
            let offer = store
                .should_offer_default_cleanup(&user_id(app)?)
                .map_err(|e| e.to_string())?;
            Ok(json!({"offer": offer}))
        }

        // ─── Metadata & classification ───
        "metadata.resolve" => {
            let url = str_param(params, "url")?;
            let resolver = app.lock().map_err(|e| e.to_string())?.resolver.clone();
            to_json(&resolver.resolve(url).await)
        }
        "platform.classify" => {
            let tag = classify_url(str_param(params, "url")?);
            Ok(json!({"platform": tag, "display_name": tag.display_name()}))
        }

        // ─── Import / export ───
        "import.preview" => {
            let text = str_param(params, "text")?;
            to_json(&parse_import_payload(text))
        }
        "import.run" => {
            let text = str_param(params, "text")?;
            let (resolver, owner) = {
                let a = app.lock().map_err(|e| e.to_string())?;
                (a.resolver.clone(), a.user_id().to_string())
            };
            let source: &dyn MetadataSource = &resolver;
            let summary = import_bookmarks(text, &owner, source, &mut store).await;
            to_json(&summary)
        }
        "export.run" => {
            let (bookmarks, default_format) = {
                let a = app.lock().map_err(|e| e.to_string())?;
                let bookmarks = a.store().list_bookmarks(a.user_id()).map_err(|e| e.to_string())?;
                (bookmarks, a.settings_engine.get_settings().export.default_format)
            };
            let format = match opt_str(params, "format") {
                Some(raw) => raw.parse::<ExportFormat>().map_err(|e| e.to_string())?,
                None => default_format,
            };
            to_json(&serialize_bookmarks(&bookmarks, format))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            match opt_str(params, "key") {
                Some(key) => a.settings_engine.get_value(key).map_err(|e| e.to_string()),
                None => to_json(a.settings_engine.get_settings()),
            }
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.set_setting(key, value)?;
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}

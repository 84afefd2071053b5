//! App core for linkshelf.
//!
//! Owns the database, the settings engine and the metadata resolver, and knows
//! which user the local shelf belongs to.

use std::path::PathBuf;

use crate::database::connection::Database;
use crate::managers::bookmark_manager::{validate_user_id, BookmarkManager};
use crate::platform;
use crate::services::metadata_resolver::MetadataResolver;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::{MetadataError, SettingsError};

pub const DB_FILE: &str = "linkshelf.db";

/// `linkshelf.db` inside the data directory (`LINKSHELF_DATA_DIR` or the platform default).
pub fn default_db_path() -> PathBuf {
    platform::get_data_dir().join(DB_FILE)
}

/// Central application struct.
///
/// `BookmarkManager` borrows the connection, so it is created on demand
/// through [`App::store`] instead of being stored here.
pub struct App {
    pub db: Database,
    pub settings_engine: SettingsEngine,
    pub resolver: MetadataResolver,
    user_id: String,
}

impl App {
    /// Opens the database at `db_path` with settings from the platform config dir.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_settings_path(db_path, None)
    }

    pub fn with_settings_path(
        db_path: &str,
        settings_path: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open(db_path)?;

        let mut settings_engine = SettingsEngine::new(settings_path);
        // An unreadable file is reported rather than replaced, since it holds the user id.
        let settings = settings_engine
            .load()
            .map_err(|e| format!("{}: {}", settings_engine.get_config_path(), e))?;

        let resolver = MetadataResolver::new(settings.metadata.clone())
            .map_err(|e| format!("MetadataResolver init failed: {}", e))?;

        let user_id = ensure_user_id(&mut settings_engine)
            .map_err(|e| format!("failed to assign user id: {}", e))?;

        tracing::info!(db = db_path, user_id = %user_id, "linkshelf ready");
        Ok(Self {
            db,
            settings_engine,
            resolver,
            user_id,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn store(&self) -> BookmarkManager<'_> {
        BookmarkManager::new(self.db.connection())
    }

    /// Rebuilds the resolver after `metadata.*` settings changed.
    pub fn reload_resolver(&mut self) -> Result<(), MetadataError> {
        self.resolver = MetadataResolver::new(self.settings_engine.get_settings().metadata.clone())?;
        Ok(())
    }

    /// Updates one setting by dot path and refreshes whatever depends on it.
    pub fn set_setting(&mut self, key: &str, value: serde_json::Value) -> Result<(), String> {
        if key == "general.user_id" {
            validate_user_id(value.as_str().unwrap_or_default()).map_err(|e| e.to_string())?;
        }
        self.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;

        if key.starts_with("metadata") {
            self.reload_resolver().map_err(|e| e.to_string())?;
        }
        if key.starts_with("general") {
            self.user_id = self.settings_engine.get_settings().general.user_id.trim().to_string();
        }
        tracing::debug!(key, "setting updated");
        Ok(())
    }
}

/// Returns the configured user id, generating and saving one on first start.
fn ensure_user_id(engine: &mut SettingsEngine) -> Result<String, SettingsError> {
    let current = engine.get_settings().general.user_id.trim().to_string();
    if !current.is_empty() {
        return Ok(current);
    }
    let user_id = uuid::Uuid::new_v4().to_string();
    engine.set_value("general.user_id", serde_json::Value::String(user_id.clone()))?;
    tracing::info!(user_id = %user_id, "assigned new local user id");
    Ok(user_id)
}

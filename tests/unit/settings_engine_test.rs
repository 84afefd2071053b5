//! Integration-level unit tests for the SettingsEngine public API.
//!
//! These tests exercise the SettingsEngine through its public trait interface,
//! validating default loading, value persistence and reset behavior.

use linkshelf::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use linkshelf::types::settings::ShelfSettings;
use linkshelf::types::transfer::ExportFormat;
use serde_json::json;
use tempfile::TempDir;

/// Helper: create a SettingsEngine backed by a temp directory that lives for the
/// duration of the test (the caller holds the `TempDir` handle).
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("nested")
        .join("settings.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, ShelfSettings::default());
    assert!(settings.general.user_id.is_empty());
    assert_eq!(settings.metadata.request_timeout_secs, 5);
    assert_eq!(settings.metadata.proxy_endpoint, None);
    assert!(settings.metadata.preview_endpoint.is_some());
    assert_eq!(settings.export.default_format, ExportFormat::Json);
    assert_eq!(settings.logging.level, "info");
}

#[test]
fn test_set_value_persists_changes() {
    let dir = TempDir::new().unwrap();
    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .set_value("metadata.proxy_endpoint", json!("https://relay.example/get"))
            .unwrap();
        engine.set_value("export.default_format", json!("html")).unwrap();
    }

    let mut engine = engine_in_temp(&dir);
    let loaded = engine.load().unwrap();
    assert_eq!(
        loaded.metadata.proxy_endpoint.as_deref(),
        Some("https://relay.example/get")
    );
    assert_eq!(loaded.export.default_format, ExportFormat::Html);
}

#[test]
fn test_optional_values_can_be_cleared() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();
    engine.set_value("metadata.preview_endpoint", json!(null)).unwrap();
    assert_eq!(engine.get_settings().metadata.preview_endpoint, None);
}

#[test]
fn test_partial_file_fills_in_defaults() {
    let dir = TempDir::new().unwrap();
    let engine = engine_in_temp(&dir);
    let path = engine.get_config_path().to_string();
    std::fs::create_dir_all(std::path::Path::new(&path).parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"logging": {"level": "debug"}}"#).unwrap();

    let mut engine = SettingsEngine::new(Some(path));
    let loaded = engine.load().unwrap();
    assert_eq!(loaded.logging.level, "debug");
    assert_eq!(loaded.metadata, ShelfSettings::default().metadata);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ invalid json }").unwrap();

    let mut engine = SettingsEngine::new(Some(path.to_string_lossy().to_string()));
    assert!(engine.load().is_err());
}

#[test]
fn test_reset_restores_defaults_on_disk() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();
    engine.set_value("logging.level", json!("warn")).unwrap();

    engine.reset().unwrap();

    let mut fresh = engine_in_temp(&dir);
    assert_eq!(fresh.load().unwrap(), ShelfSettings::default());
}

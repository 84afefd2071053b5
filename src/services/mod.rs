// linkshelf services: metadata lookup, classification, import/export, form state, settings.

pub mod bookmark_form;
pub mod debounce;
pub mod import_export;
pub mod metadata_resolver;
pub mod platform_classifier;
pub mod settings_engine;

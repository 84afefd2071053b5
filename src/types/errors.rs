use std::fmt;

// === BookmarkError ===

/// Errors related to bookmark storage operations.
#[derive(Debug)]
pub enum BookmarkError {
    /// Bookmark with the given ID was not found.
    NotFound(String),
    /// The URL is empty, unparseable, or not http(s).
    InvalidUrl(String),
    /// A required field is missing or empty.
    MissingField(String),
    /// The owning user ID is malformed.
    InvalidUserId(String),
    /// The reminder date lies in the past.
    InvalidReminder(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::InvalidUrl(url) => write!(f, "Invalid bookmark URL: {}", url),
            BookmarkError::MissingField(field) => {
                write!(f, "Missing required bookmark field: {}", field)
            }
            BookmarkError::InvalidUserId(id) => write!(f, "Invalid user ID format: {}", id),
            BookmarkError::InvalidReminder(msg) => write!(f, "Invalid reminder: {}", msg),
            BookmarkError::DatabaseError(msg) => {
                write!(f, "Bookmark database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for BookmarkError {}

impl From<rusqlite::Error> for BookmarkError {
    fn from(e: rusqlite::Error) -> Self {
        BookmarkError::DatabaseError(e.to_string())
    }
}

// === MetadataError ===

/// Failures of a single metadata strategy. The resolver recovers from all of them.
#[derive(Debug)]
pub enum MetadataError {
    /// The URL cannot be fetched (unparseable, relative, or non-http scheme).
    InvalidUrl(String),
    /// Transport failure: DNS, connect, timeout, body read.
    Network(String),
    /// The remote answered with a non-success status.
    HttpStatus(u16),
    /// The response body could not be interpreted.
    Parse(String),
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::InvalidUrl(url) => write!(f, "Unfetchable URL: {}", url),
            MetadataError::Network(msg) => write!(f, "Metadata network error: {}", msg),
            MetadataError::HttpStatus(code) => write!(f, "Metadata request returned status {}", code),
            MetadataError::Parse(msg) => write!(f, "Metadata parse error: {}", msg),
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<reqwest::Error> for MetadataError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => MetadataError::HttpStatus(status.as_u16()),
            None => MetadataError::Network(e.to_string()),
        }
    }
}

// === ExportError ===

/// Errors related to bookmark export.
#[derive(Debug, PartialEq, Eq)]
pub enum ExportError {
    /// The requested export format is not one of json, csv, html.
    UnknownFormat(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::UnknownFormat(format) => write!(f, "Unknown export format: {}", format),
        }
    }
}

impl std::error::Error for ExportError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

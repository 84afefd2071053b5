use serde::{Deserialize, Serialize};

/// Best-effort page metadata. Fields are empty strings when unknown, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataResult {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
}

impl MetadataResult {
    pub fn new(title: impl Into<String>, description: impl Into<String>, thumbnail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            thumbnail: thumbnail.into(),
        }
    }

    pub fn title_only(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

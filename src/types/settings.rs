use serde::{Deserialize, Serialize};

use super::transfer::ExportFormat;

/// Top-level settings container persisted as `settings.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ShelfSettings {
    pub general: GeneralSettings,
    pub metadata: MetadataSettings,
    pub export: ExportSettings,
    pub logging: LoggingSettings,
}

/// Identity of the local shelf owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GeneralSettings {
    /// Empty until the app assigns one on first start.
    pub user_id: String,
}

/// Endpoints and limits used by the metadata resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetadataSettings {
    pub video_embeds_enabled: bool,
    pub youtube_oembed_endpoint: String,
    pub vimeo_oembed_endpoint: String,
    /// Link-preview service. `None` skips that strategy.
    pub preview_endpoint: Option<String>,
    pub preview_api_key: Option<String>,
    /// CORS relay returning `{"contents": "<html>"}`. `None` fetches pages directly.
    pub proxy_endpoint: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            video_embeds_enabled: true,
            youtube_oembed_endpoint: "https://www.youtube.com/oembed".to_string(),
            vimeo_oembed_endpoint: "https://vimeo.com/api/oembed.json".to_string(),
            preview_endpoint: Some("https://api.linkpreview.net/".to_string()),
            preview_api_key: None,
            proxy_endpoint: None,
            request_timeout_secs: 5,
            user_agent: concat!("linkshelf/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ExportSettings {
    pub default_format: ExportFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

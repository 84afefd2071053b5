//! Metadata resolver for linkshelf.
//!
//! Turns a bare URL into a best-effort title, description and thumbnail by
//! walking an ordered chain of strategies: video oEmbed lookup, a link-preview
//! service, then fetching and parsing the page itself. The first strategy that
//! produces a result wins; when all fail the hostname is used as the title.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

use crate::types::errors::MetadataError;
use crate::types::metadata::MetadataResult;
use crate::types::settings::MetadataSettings;

/// Pages larger than this are not parsed.
const PAGE_HTML_MAX_BYTES: usize = 2 * 1024 * 1024;

/// Anything that can produce metadata for a URL without failing.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn resolve(&self, url: &str) -> MetadataResult;
}

/// One step of the resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    VideoEmbed,
    LinkPreview,
    PageScrape,
}

impl Strategy {
    pub const CHAIN: [Strategy; 3] = [Strategy::VideoEmbed, Strategy::LinkPreview, Strategy::PageScrape];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::VideoEmbed => "video-embed",
            Strategy::LinkPreview => "link-preview",
            Strategy::PageScrape => "page-scrape",
        }
    }
}

/// Video site with a public oEmbed endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSite {
    Youtube,
    Vimeo,
}

impl VideoSite {
    const ALL: [VideoSite; 2] = [VideoSite::Youtube, VideoSite::Vimeo];

    fn matches_host(&self, host: &str) -> bool {
        match self {
            VideoSite::Youtube => host.contains("youtube.com") || host.contains("youtu.be"),
            VideoSite::Vimeo => host.contains("vimeo.com"),
        }
    }

    fn id_pattern(&self) -> &'static Regex {
        static YOUTUBE: OnceLock<Regex> = OnceLock::new();
        static VIMEO: OnceLock<Regex> = OnceLock::new();
        match self {
            VideoSite::Youtube => YOUTUBE.get_or_init(|| {
                Regex::new(
                    r"(?:youtube\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/|live/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})",
                )
                .expect("valid youtube id pattern")
            }),
            VideoSite::Vimeo => VIMEO.get_or_init(|| {
                Regex::new(r"vimeo\.com/(?:video/|channels/[^/]+/)?(\d+)").expect("valid vimeo id pattern")
            }),
        }
    }

    fn canonical_url(&self, id: &str) -> String {
        match self {
            VideoSite::Youtube => format!("https://www.youtube.com/watch?v={}", id),
            VideoSite::Vimeo => format!("https://vimeo.com/{}", id),
        }
    }

    fn endpoint<'s>(&self, settings: &'s MetadataSettings) -> &'s str {
        match self {
            VideoSite::Youtube => &settings.youtube_oembed_endpoint,
            VideoSite::Vimeo => &settings.vimeo_oembed_endpoint,
        }
    }
}

/// Finds the video site and canonical watch URL for `url`, if it is a recognised video link.
pub fn detect_video(url: &Url) -> Option<(VideoSite, String)> {
    let host = url.host_str()?.to_ascii_lowercase();
    VideoSite::ALL.iter().find_map(|site| {
        if !site.matches_host(&host) {
            return None;
        }
        let caps = site.id_pattern().captures(url.as_str())?;
        let id = caps.get(1)?.as_str();
        Some((*site, site.canonical_url(id)))
    })
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
    author_name: Option<String>,
    thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkPreviewResponse {
    title: Option<String>,
    description: Option<String>,
    image: Option<String>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RelayEnvelope {
    contents: Option<String>,
}

/// HTTP-backed resolver configured from [`MetadataSettings`]. Clones share the connection pool.
#[derive(Clone)]
pub struct MetadataResolver {
    client: reqwest::Client,
    settings: MetadataSettings,
}

impl MetadataResolver {
    pub fn new(settings: MetadataSettings) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(8))
            .timeout(Duration::from_secs(settings.request_timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(settings.request_timeout_secs.clamp(1, 4)))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| MetadataError::Network(format!("failed to build http client: {}", e)))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &MetadataSettings {
        &self.settings
    }

    /// Resolves metadata for `url`. Never fails; see [`fallback_metadata`] for the floor.
    pub async fn resolve(&self, url: &str) -> MetadataResult {
        let target = match fetchable_url(url) {
            Some(target) => target,
            None => {
                tracing::debug!(url, "not an absolute http(s) url, using fallback metadata");
                return fallback_metadata(url);
            }
        };

        tracing::info!(url = %target, "fetching metadata");
        for strategy in Strategy::CHAIN {
            match self.attempt(strategy, &target).await {
                Ok(Some(result)) => {
                    tracing::info!(url = %target, strategy = strategy.name(), title = %result.title, "metadata loaded");
                    return result;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(url = %target, strategy = strategy.name(), error = %e, "metadata strategy failed");
                }
            }
        }

        tracing::warn!(url = %target, "could not extract metadata, falling back to hostname");
        fallback_metadata(url)
    }

    /// `Ok(None)` means the strategy does not apply to this URL.
    async fn attempt(&self, strategy: Strategy, target: &Url) -> Result<Option<MetadataResult>, MetadataError> {
        match strategy {
            Strategy::VideoEmbed => self.video_embed(target).await,
            Strategy::LinkPreview => self.link_preview(target).await,
            Strategy::PageScrape => self.page_scrape(target).await.map(Some),
        }
    }

    async fn video_embed(&self, target: &Url) -> Result<Option<MetadataResult>, MetadataError> {
        if !self.settings.video_embeds_enabled {
            return Ok(None);
        }
        let Some((site, canonical)) = detect_video(target) else {
            return Ok(None);
        };

        let endpoint = Url::parse_with_params(
            site.endpoint(&self.settings),
            &[("url", canonical.as_str()), ("format", "json")],
        )
        .map_err(|e| MetadataError::InvalidUrl(e.to_string()))?;

        let body = self.get_text(endpoint).await?;
        let embed: OEmbedResponse =
            serde_json::from_str(&body).map_err(|e| MetadataError::Parse(e.to_string()))?;

        let title = collapse_whitespace(embed.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            return Err(MetadataError::Parse("oEmbed response has no title".to_string()));
        }
        let description = embed
            .author_name
            .map(|author| collapse_whitespace(&author))
            .filter(|author| !author.is_empty())
            .map(|author| format!("By {}", author))
            .unwrap_or_default();

        Ok(Some(MetadataResult::new(
            title,
            description,
            embed.thumbnail_url.unwrap_or_default(),
        )))
    }

    async fn link_preview(&self, target: &Url) -> Result<Option<MetadataResult>, MetadataError> {
        let Some(endpoint) = self.settings.preview_endpoint.as_deref() else {
            return Ok(None);
        };
        let endpoint = Url::parse_with_params(endpoint, &[("q", target.as_str())])
            .map_err(|e| MetadataError::InvalidUrl(e.to_string()))?;

        let mut request = self.client.post(endpoint).header(ACCEPT, "application/json");
        if let Some(key) = self.settings.preview_api_key.as_deref() {
            request = request.header("X-Linkpreview-Api-Key", key);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(MetadataError::HttpStatus(response.status().as_u16()));
        }
        let body = response.text().await?;
        let preview: LinkPreviewResponse =
            serde_json::from_str(&body).map_err(|e| MetadataError::Parse(e.to_string()))?;
        if let Some(error) = preview.error {
            return Err(MetadataError::Parse(format!("preview service error: {}", error)));
        }

        let title = preview
            .title
            .map(|t| collapse_whitespace(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| target.as_str().to_string());
        Ok(Some(MetadataResult::new(
            title,
            preview.description.unwrap_or_default(),
            preview.image.unwrap_or_default(),
        )))
    }

    async fn page_scrape(&self, target: &Url) -> Result<MetadataResult, MetadataError> {
        let (page_url, html) = match self.settings.proxy_endpoint.as_deref() {
            Some(proxy) => (target.clone(), self.fetch_via_relay(proxy, target).await?),
            None => self.fetch_direct(target).await?,
        };
        Ok(extract_page_metadata(&html, &page_url))
    }

    async fn fetch_via_relay(&self, proxy: &str, target: &Url) -> Result<String, MetadataError> {
        let endpoint = Url::parse_with_params(proxy, &[("url", target.as_str())])
            .map_err(|e| MetadataError::InvalidUrl(e.to_string()))?;
        let body = self.get_text(endpoint).await?;
        let envelope: RelayEnvelope =
            serde_json::from_str(&body).map_err(|e| MetadataError::Parse(e.to_string()))?;
        envelope
            .contents
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| MetadataError::Parse("no content received from relay".to_string()))
    }

    async fn fetch_direct(&self, target: &Url) -> Result<(Url, String), MetadataError> {
        let response = self
            .client
            .get(target.clone())
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await?;

        let final_url = response.url().clone();
        if !response.status().is_success() {
            return Err(MetadataError::HttpStatus(response.status().as_u16()));
        }
        if response
            .content_length()
            .map_or(false, |len| len as usize > PAGE_HTML_MAX_BYTES)
        {
            return Err(MetadataError::Parse("page too large".to_string()));
        }

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                let value = value.to_ascii_lowercase();
                value.contains("text/html") || value.contains("application/xhtml")
            })
            .unwrap_or(true);
        if !is_html {
            return Err(MetadataError::Parse("response is not html".to_string()));
        }

        let bytes = response.bytes().await?;
        if bytes.len() > PAGE_HTML_MAX_BYTES {
            return Err(MetadataError::Parse("page too large".to_string()));
        }
        Ok((final_url, String::from_utf8_lossy(&bytes).into_owned()))
    }

    async fn get_text(&self, endpoint: Url) -> Result<String, MetadataError> {
        let response = self
            .client
            .get(endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(MetadataError::HttpStatus(response.status().as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl MetadataSource for MetadataResolver {
    async fn resolve(&self, url: &str) -> MetadataResult {
        MetadataResolver::resolve(self, url).await
    }
}

/// Parses `raw` as an absolute http(s) URL with a host.
pub fn fetchable_url(raw: &str) -> Option<Url> {
    let parsed = Url::parse(raw.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }
    Some(parsed)
}

/// Last-resort result: the hostname, or the trimmed input when it does not parse.
pub fn fallback_metadata(raw: &str) -> MetadataResult {
    let trimmed = raw.trim();
    let title = Url::parse(trimmed)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| trimmed.to_string());
    MetadataResult::title_only(title)
}

/// Extracts metadata from an HTML document, resolving relative image links against `page_url`.
pub fn extract_page_metadata(html: &str, page_url: &Url) -> MetadataResult {
    let document = Html::parse_document(html);
    let meta = collect_meta(&document);
    let lookup = |keys: &[&str]| -> Option<String> {
        keys.iter().find_map(|key| meta.get(*key).cloned())
    };

    let title = lookup(&["og:title", "twitter:title"])
        .or_else(|| first_text(&document, "title"))
        .or_else(|| first_text(&document, "h1"))
        .or_else(|| page_url.host_str().map(str::to_string))
        .unwrap_or_default();

    let description = lookup(&["og:description", "description", "twitter:description"]).unwrap_or_default();

    let thumbnail = lookup(&["og:image", "og:image:url", "twitter:image"])
        .or_else(|| favicon_href(&document))
        .map(|href| resolve_link(page_url, &href))
        .unwrap_or_default();

    MetadataResult::new(title, description, thumbnail)
}

/// First non-empty `content` per lower-cased `property`/`name`.
fn collect_meta(document: &Html) -> HashMap<String, String> {
    let mut found = HashMap::new();
    let Ok(selector) = Selector::parse("meta[content]") else {
        return found;
    };
    for node in document.select(&selector) {
        let element = node.value();
        let Some(key) = element
            .attr("property")
            .or_else(|| element.attr("name"))
            .map(|k| k.trim().to_ascii_lowercase())
        else {
            continue;
        };
        let content = element.attr("content").map(collapse_whitespace).unwrap_or_default();
        if !content.is_empty() {
            found.entry(key).or_insert(content);
        }
    }
    found
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let node = document.select(&selector).next()?;
    let text = collapse_whitespace(&node.text().collect::<Vec<_>>().join(" "));
    (!text.is_empty()).then_some(text)
}

fn favicon_href(document: &Html) -> Option<String> {
    let selector = Selector::parse("link[rel][href]").ok()?;
    document.select(&selector).find_map(|node| {
        let element = node.value();
        let rel = element.attr("rel")?.to_ascii_lowercase();
        if !rel.split_whitespace().any(|token| token == "icon") {
            return None;
        }
        let href = element.attr("href")?.trim();
        (!href.is_empty()).then(|| href.to_string())
    })
}

fn resolve_link(page_url: &Url, href: &str) -> String {
    page_url
        .join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

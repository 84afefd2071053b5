//! Platform classifier for linkshelf.
//!
//! Maps a URL's hostname to a [`PlatformTag`] through an ordered, data-driven
//! table. Adding a platform is a new table row, not a new branch.

use url::Url;

use crate::types::bookmark::Bookmark;
use crate::types::platform::{PlatformFilter, PlatformTag};

/// How a table entry is compared against a lower-cased hostname.
#[derive(Debug, Clone, Copy)]
pub enum HostMatcher {
    /// Substring containment anywhere in the host.
    Contains(&'static str),
    /// Host equals the value or is a subdomain of it.
    Domain(&'static str),
}

impl HostMatcher {
    pub fn matches(&self, host: &str) -> bool {
        match self {
            HostMatcher::Contains(needle) => host.contains(needle),
            HostMatcher::Domain(domain) => {
                host == *domain
                    || host
                        .strip_suffix(domain)
                        .map_or(false, |prefix| prefix.ends_with('.'))
            }
        }
    }
}

/// Evaluated top to bottom; first match wins.
pub const PLATFORM_TABLE: &[(&[HostMatcher], PlatformTag)] = &[
    (
        &[
            HostMatcher::Contains("twitter.com"),
            HostMatcher::Domain("x.com"),
            HostMatcher::Domain("t.co"),
        ],
        PlatformTag::Twitter,
    ),
    (
        &[
            HostMatcher::Contains("facebook.com"),
            HostMatcher::Domain("fb.com"),
            HostMatcher::Domain("fb.watch"),
        ],
        PlatformTag::Facebook,
    ),
    (&[HostMatcher::Contains("instagram.com")], PlatformTag::Instagram),
    (
        &[HostMatcher::Contains("linkedin.com"), HostMatcher::Domain("lnkd.in")],
        PlatformTag::Linkedin,
    ),
    (
        &[HostMatcher::Contains("youtube.com"), HostMatcher::Contains("youtu.be")],
        PlatformTag::Youtube,
    ),
    (
        &[HostMatcher::Contains("reddit.com"), HostMatcher::Domain("redd.it")],
        PlatformTag::Reddit,
    ),
    (
        &[HostMatcher::Contains("pinterest."), HostMatcher::Domain("pin.it")],
        PlatformTag::Pinterest,
    ),
    (
        &[HostMatcher::Contains("chatgpt.com"), HostMatcher::Domain("chat.openai.com")],
        PlatformTag::Chatgpt,
    ),
];

/// Classifies a hostname that is already lower-cased.
pub fn classify_host(host: &str) -> PlatformTag {
    PLATFORM_TABLE
        .iter()
        .find(|(matchers, _)| matchers.iter().any(|m| m.matches(host)))
        .map(|(_, tag)| *tag)
        .unwrap_or(PlatformTag::Others)
}

/// Returns the platform a URL belongs to. Never fails: anything unparseable
/// or unrecognized is `Others`.
pub fn classify_url(url: &str) -> PlatformTag {
    match Url::parse(url.trim()) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => classify_host(&host.to_ascii_lowercase()),
            None => PlatformTag::Others,
        },
        Err(_) => PlatformTag::Others,
    }
}

pub fn matches_filter(bookmark: &Bookmark, filter: PlatformFilter) -> bool {
    filter.matches(bookmark.source)
}

/// In-memory platform filter over an already loaded collection.
pub fn filter_by_platform(bookmarks: &[Bookmark], filter: PlatformFilter) -> Vec<Bookmark> {
    bookmarks
        .iter()
        .filter(|b| matches_filter(b, filter))
        .cloned()
        .collect()
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source platform a bookmark was saved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTag {
    Twitter,
    Facebook,
    Instagram,
    Linkedin,
    Youtube,
    Reddit,
    Pinterest,
    Chatgpt,
    #[default]
    Others,
}

impl PlatformTag {
    /// Every tag, in the order the platform selector lists them.
    pub const ALL: [PlatformTag; 9] = [
        PlatformTag::Twitter,
        PlatformTag::Facebook,
        PlatformTag::Instagram,
        PlatformTag::Linkedin,
        PlatformTag::Youtube,
        PlatformTag::Reddit,
        PlatformTag::Pinterest,
        PlatformTag::Chatgpt,
        PlatformTag::Others,
    ];

    /// Lowercase label used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformTag::Twitter => "twitter",
            PlatformTag::Facebook => "facebook",
            PlatformTag::Instagram => "instagram",
            PlatformTag::Linkedin => "linkedin",
            PlatformTag::Youtube => "youtube",
            PlatformTag::Reddit => "reddit",
            PlatformTag::Pinterest => "pinterest",
            PlatformTag::Chatgpt => "chatgpt",
            PlatformTag::Others => "others",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformTag::Twitter => "Twitter",
            PlatformTag::Facebook => "Facebook",
            PlatformTag::Instagram => "Instagram",
            PlatformTag::Linkedin => "LinkedIn",
            PlatformTag::Youtube => "YouTube",
            PlatformTag::Reddit => "Reddit",
            PlatformTag::Pinterest => "Pinterest",
            PlatformTag::Chatgpt => "ChatGPT",
            PlatformTag::Others => "Others",
        }
    }

    /// Parses a label, mapping anything unrecognized to `Others`.
    pub fn from_label_lossy(label: &str) -> Self {
        label.parse().unwrap_or(PlatformTag::Others)
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        PlatformTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == needle)
            .ok_or_else(|| format!("unknown platform: {}", s))
    }
}

/// Platform filter applied to a bookmark listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Platform(PlatformTag),
}

impl PlatformFilter {
    pub fn matches(&self, tag: PlatformTag) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Platform(wanted) => *wanted == tag,
        }
    }
}

impl FromStr for PlatformFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") || s.trim().is_empty() {
            return Ok(PlatformFilter::All);
        }
        s.parse().map(PlatformFilter::Platform)
    }
}

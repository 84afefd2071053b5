//! Unit tests for hostname-based platform classification.

use chrono::Utc;
use rstest::rstest;

use linkshelf::services::platform_classifier::{classify_host, classify_url, filter_by_platform};
use linkshelf::types::bookmark::Bookmark;
use linkshelf::types::platform::{PlatformFilter, PlatformTag};

#[rstest]
#[case("https://twitter.com/rustlang/status/1", PlatformTag::Twitter)]
#[case("https://x.com/rustlang", PlatformTag::Twitter)]
#[case("https://mobile.twitter.com/a", PlatformTag::Twitter)]
#[case("https://t.co/abc", PlatformTag::Twitter)]
#[case("https://www.facebook.com/groups/1", PlatformTag::Facebook)]
#[case("https://fb.watch/xyz", PlatformTag::Facebook)]
#[case("https://www.instagram.com/p/abc/", PlatformTag::Instagram)]
#[case("https://www.linkedin.com/in/someone", PlatformTag::Linkedin)]
#[case("https://lnkd.in/abc", PlatformTag::Linkedin)]
#[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", PlatformTag::Youtube)]
#[case("https://youtu.be/dQw4w9WgXcQ", PlatformTag::Youtube)]
#[case("https://old.reddit.com/r/rust", PlatformTag::Reddit)]
#[case("https://redd.it/abc", PlatformTag::Reddit)]
#[case("https://www.pinterest.co.uk/pin/1", PlatformTag::Pinterest)]
#[case("https://pin.it/abc", PlatformTag::Pinterest)]
#[case("https://chatgpt.com/share/abc", PlatformTag::Chatgpt)]
#[case("https://chat.openai.com/c/abc", PlatformTag::Chatgpt)]
#[case("HTTPS://WWW.YOUTUBE.COM/watch?v=x", PlatformTag::Youtube)]
fn test_classifies_known_platforms(#[case] url: &str, #[case] expected: PlatformTag) {
    assert_eq!(classify_url(url), expected);
}

#[rstest]
#[case("https://www.netflix.com/title/1")]
#[case("https://example.com/x.com")]
#[case("https://rust-lang.org")]
#[case("not a url")]
#[case("")]
#[case("mailto:someone@twitter.com")]
#[case("/relative/path")]
fn test_unknown_or_invalid_is_others(#[case] url: &str) {
    assert_eq!(classify_url(url), PlatformTag::Others);
}

#[test]
fn test_classify_host_expects_lowercase_hosts() {
    assert_eq!(classify_host("www.reddit.com"), PlatformTag::Reddit);
    assert_eq!(classify_host("example.org"), PlatformTag::Others);
}

fn bookmark(id: &str, source: PlatformTag) -> Bookmark {
    Bookmark {
        id: id.to_string(),
        title: id.to_string(),
        url: format!("https://{}.example", id),
        description: None,
        thumbnail: None,
        source,
        tags: Vec::new(),
        created_at: Utc::now(),
        user_id: "user-0000000001".to_string(),
        reminder_at: None,
    }
}

#[test]
fn test_filter_by_platform_keeps_matching_bookmarks() {
    let all = vec![
        bookmark("a", PlatformTag::Youtube),
        bookmark("b", PlatformTag::Reddit),
        bookmark("c", PlatformTag::Youtube),
    ];

    assert_eq!(filter_by_platform(&all, PlatformFilter::All).len(), 3);
    let youtube = filter_by_platform(&all, PlatformFilter::Platform(PlatformTag::Youtube));
    assert_eq!(
        youtube.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
        vec!["a", "c"]
    );
    assert!(filter_by_platform(&all, PlatformFilter::Platform(PlatformTag::Others)).is_empty());
}

#[test]
fn test_platform_filter_parses_labels() {
    assert_eq!("all".parse::<PlatformFilter>().unwrap(), PlatformFilter::All);
    assert_eq!("".parse::<PlatformFilter>().unwrap(), PlatformFilter::All);
    assert_eq!(
        "YouTube".parse::<PlatformFilter>().unwrap(),
        PlatformFilter::Platform(PlatformTag::Youtube)
    );
    assert!("myspace".parse::<PlatformFilter>().is_err());
}

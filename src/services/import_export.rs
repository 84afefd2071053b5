//! Import/export normalizer for linkshelf.
//!
//! Import sniffs pasted text (JSON, Netscape bookmark HTML, CSV, or a plain
//! list of URLs) into [`ImportDraft`]s and persists them one by one. Export
//! serializes a collection into JSON, CSV or a Netscape bookmark file.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::managers::bookmark_manager::BookmarkStore;
use crate::services::metadata_resolver::MetadataSource;
use crate::types::bookmark::{Bookmark, NewBookmark};
use crate::types::errors::BookmarkError;
use crate::types::metadata::MetadataResult;
use crate::types::platform::PlatformTag;
use crate::types::transfer::{ExportFile, ExportFormat, ImportDraft, ImportFailure, ImportSummary};

pub const CSV_HEADER: &str = "Title,URL,Description,Source,Created At";

const NETSCAPE_DOCTYPE: &str = "<!doctype netscape-bookmark-file-1>";

type Detector = fn(&str) -> Option<Vec<ImportDraft>>;

/// Format detectors, tried in order. The URL list accepts anything.
const DETECTORS: [(&str, Detector); 4] = [
    ("json", parse_json_payload),
    ("netscape-html", parse_netscape_payload),
    ("csv", parse_csv_payload),
    ("url-list", parse_url_list_payload),
];

/// Parses pasted text into drafts. Never fails; unusable input yields no drafts.
pub fn parse_import_payload(text: &str) -> Vec<ImportDraft> {
    for (format, detector) in DETECTORS {
        if let Some(drafts) = detector(text) {
            tracing::debug!(format, count = drafts.len(), "import payload detected");
            return drafts;
        }
    }
    Vec::new()
}

fn parse_json_payload(text: &str) -> Option<Vec<ImportDraft>> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let drafts = match &value {
        Value::Array(items) => items.iter().map(draft_from_json).collect(),
        Value::Object(map) => match map.get("bookmarks") {
            Some(Value::Array(items)) => items.iter().map(draft_from_json).collect(),
            _ => vec![draft_from_json(&value)],
        },
        _ => Vec::new(),
    };
    Some(drafts)
}

/// Reads the known fields of one JSON record. Non-objects give an empty draft.
fn draft_from_json(value: &Value) -> ImportDraft {
    let Value::Object(map) = value else {
        return ImportDraft::default();
    };
    let text = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let tags = match map.get("tags") {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        ),
        Some(Value::String(joined)) => Some(split_tags(joined)),
        _ => None,
    };

    ImportDraft {
        title: text(&["title"]),
        url: text(&["url"]),
        description: text(&["description"]),
        source: text(&["source", "platform"]),
        tags,
        thumbnail: text(&["thumbnail", "image"]),
    }
}

fn parse_netscape_payload(text: &str) -> Option<Vec<ImportDraft>> {
    let head: String = text.trim_start().chars().take(NETSCAPE_DOCTYPE.len()).collect();
    if !head.eq_ignore_ascii_case(NETSCAPE_DOCTYPE) {
        return None;
    }

    let document = Html::parse_document(text);
    let selector = Selector::parse("a[href]").ok()?;
    let drafts = document
        .select(&selector)
        .map(|anchor| {
            let title = collapse_whitespace(&anchor.text().collect::<String>());
            let description = anchor
                .parent()
                .and_then(ElementRef::wrap)
                .filter(|parent| parent.value().name() == "li")
                .and_then(|li| {
                    let full = collapse_whitespace(&li.text().collect::<String>());
                    let rest = full.strip_prefix(title.as_str())?.trim_start();
                    let rest = rest.strip_prefix('-')?.trim();
                    (!rest.is_empty()).then(|| rest.to_string())
                });
            ImportDraft {
                title: (!title.is_empty()).then_some(title),
                url: anchor.value().attr("href").map(|h| h.trim().to_string()),
                description,
                ..ImportDraft::default()
            }
        })
        .collect();
    Some(drafts)
}

fn parse_csv_payload(text: &str) -> Option<Vec<ImportDraft>> {
    if !text.contains(',') {
        return None;
    }

    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();
    if let Some(first) = lines.peek() {
        let header_like = split_csv_line(first)
            .first()
            .map_or(false, |field| field.to_lowercase().contains("title"));
        if header_like {
            lines.next();
        }
    }

    let drafts = lines
        .map(|line| {
            let mut fields = split_csv_line(line).into_iter().map(|f| {
                let f = f.trim().to_string();
                (!f.is_empty()).then_some(f)
            });
            ImportDraft {
                title: fields.next().flatten(),
                url: fields.next().flatten(),
                description: fields.next().flatten(),
                source: fields.next().flatten(),
                ..ImportDraft::default()
            }
        })
        .collect();
    Some(drafts)
}

fn parse_url_list_payload(text: &str) -> Option<Vec<ImportDraft>> {
    Some(
        text.lines()
            .map(str::trim)
            .filter(|line| line.contains("://"))
            .map(ImportDraft::from_url)
            .collect(),
    )
}

/// Splits one CSV line on commas outside double quotes. `""` inside quotes is a literal quote.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Splits a comma-separated tag string, dropping blanks.
pub fn split_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Copies resolved metadata into the draft's empty fields only.
pub fn merge_metadata(draft: &mut ImportDraft, metadata: &MetadataResult) {
    fn fill(slot: &mut Option<String>, value: &str) {
        let empty = slot.as_deref().map_or(true, |s| s.trim().is_empty());
        if empty && !value.is_empty() {
            *slot = Some(value.to_string());
        }
    }
    fill(&mut draft.title, &metadata.title);
    fill(&mut draft.description, &metadata.description);
    fill(&mut draft.thumbnail, &metadata.thumbnail);
}

/// Converts a draft into an insertable bookmark. The title falls back to the URL.
pub fn draft_to_new_bookmark(draft: ImportDraft, user_id: &str) -> Result<NewBookmark, BookmarkError> {
    let url = draft
        .url()
        .map(str::to_string)
        .ok_or_else(|| BookmarkError::MissingField("url".to_string()))?;
    let title = draft
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| url.clone());
    let source = draft
        .source
        .as_deref()
        .map(PlatformTag::from_label_lossy)
        .unwrap_or(PlatformTag::Others);

    Ok(NewBookmark {
        title,
        url,
        description: draft.description,
        thumbnail: draft.thumbnail,
        source,
        tags: draft.tags.unwrap_or_default(),
        user_id: user_id.to_string(),
        reminder_at: None,
    })
}

/// Parses `text` and persists each draft in order.
///
/// Untitled drafts are completed through `metadata` first. A failing draft is
/// recorded in the summary and does not stop the remaining ones.
pub async fn import_bookmarks<M, S>(text: &str, user_id: &str, metadata: &M, store: &mut S) -> ImportSummary
where
    M: MetadataSource + ?Sized,
    S: BookmarkStore + ?Sized,
{
    let drafts = parse_import_payload(text);
    let mut summary = ImportSummary::default();
    tracing::info!(count = drafts.len(), "importing bookmarks");

    for (index, mut draft) in drafts.into_iter().enumerate() {
        summary.attempted += 1;
        let url = draft.url().map(str::to_string);

        if url.is_some() && !draft.has_title() {
            if let Some(target) = url.as_deref() {
                let resolved = metadata.resolve(target).await;
                merge_metadata(&mut draft, &resolved);
            }
        }

        let outcome = draft_to_new_bookmark(draft, user_id).and_then(|new| store.create_bookmark(new));
        match outcome {
            Ok(_) => summary.succeeded += 1,
            Err(e) => {
                tracing::warn!(index, url = url.as_deref().unwrap_or(""), error = %e, "failed to import bookmark");
                summary.failures.push(ImportFailure {
                    index,
                    url,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(succeeded = summary.succeeded, attempted = summary.attempted, "import finished");
    summary
}

/// Serializes bookmarks into a downloadable file.
pub fn serialize_bookmarks(bookmarks: &[Bookmark], format: ExportFormat) -> ExportFile {
    let content = match format {
        ExportFormat::Json => to_json(bookmarks),
        ExportFormat::Csv => to_csv(bookmarks),
        ExportFormat::Html => to_netscape_html(bookmarks),
    };
    ExportFile {
        content,
        filename: format.filename().to_string(),
        mime_type: format.mime_type().to_string(),
    }
}

fn to_json(bookmarks: &[Bookmark]) -> String {
    // Bookmarks only hold strings, dates and string lists, which always serialize.
    serde_json::to_string_pretty(bookmarks).unwrap_or_else(|_| "[]".to_string())
}

fn to_csv(bookmarks: &[Bookmark]) -> String {
    let mut lines = Vec::with_capacity(bookmarks.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for b in bookmarks {
        let created_at = b.created_at.to_rfc3339();
        let row = [
            b.title.as_str(),
            b.url.as_str(),
            b.description.as_deref().unwrap_or(""),
            b.source.as_str(),
            created_at.as_str(),
        ]
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",");
        lines.push(row);
    }
    lines.join("\n")
}

/// Quotes a CSV field, doubling embedded quotes.
pub fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn to_netscape_html(bookmarks: &[Bookmark]) -> String {
    let mut html = String::from("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n");
    html.push_str("<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n");
    html.push_str("<TITLE>Bookmarks</TITLE>\n");
    html.push_str("<H1>Bookmarks</H1>\n");
    html.push_str("<ul>\n");
    for b in bookmarks {
        html.push_str(&format!(
            "  <li><a href=\"{}\">{}</a>",
            escape_html(&b.url),
            escape_html(&b.title)
        ));
        if let Some(description) = b.description.as_deref().filter(|d| !d.is_empty()) {
            html.push_str(&format!(" - {}", escape_html(description)));
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ul>\n");
    html
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

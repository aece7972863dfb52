//! Turns raw feed items into canonical [`Article`] records.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{parse_published, Article, RawItem};
use crate::errors::{NewsError, NewsResult};

/// Maximum number of characters kept from a content snippet.
pub const SUMMARY_MAX_CHARS: usize = 150;
pub const ELLIPSIS: &str = "...";

static IMAGE_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).unwrap()
});

/// Normalize one raw item.
///
/// Fails with [`NewsError::Validation`] when the item has neither a guid nor a
/// link, since it could never be deduplicated.
pub fn normalize(raw: RawItem) -> NewsResult<Article> {
    let external_id = non_blank(raw.guid.as_deref())
        .or_else(|| non_blank(raw.link.as_deref()))
        .map(str::to_string)
        .ok_or_else(|| {
            NewsError::Validation(format!("item '{}' has neither guid nor link", raw.title))
        })?;

    let image_ref = raw.content.as_deref().and_then(extract_image);
    let summary = raw
        .content_snippet
        .as_deref()
        .map(truncate_summary)
        .unwrap_or_default();
    let published_at = raw.iso_date.as_deref().and_then(parse_published);

    Ok(Article::new(external_id, raw.title, raw.link.unwrap_or_default())
        .with_published_at(published_at)
        .with_summary(summary)
        .with_image_ref(image_ref))
}

/// First `<img src>` in the content. Best effort: no relevance ranking.
pub fn extract_image(content: &str) -> Option<String> {
    IMAGE_SRC
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Keep the first [`SUMMARY_MAX_CHARS`] characters and append [`ELLIPSIS`].
/// An empty snippet stays empty.
pub fn truncate_summary(snippet: &str) -> String {
    if snippet.is_empty() {
        return String::new();
    }
    let mut summary: String = snippet.chars().take(SUMMARY_MAX_CHARS).collect();
    summary.push_str(ELLIPSIS);
    summary
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

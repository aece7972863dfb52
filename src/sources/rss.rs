use std::time::Duration;

use feed_rs::parser;
use reqwest::blocking::Client;
use scraper::Html;

use crate::domain::RawItem;
use crate::errors::{NewsError, NewsResult};
use crate::sources::traits::FeedTransport;

/// Fetches an RSS/Atom/JSON feed over HTTP and flattens its entries.
pub struct HttpFeedTransport {
    client: Client,
    feed_url: String,
}

impl HttpFeedTransport {
    pub fn new(feed_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            feed_url: feed_url.into(),
        }
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    fn download(&self) -> Result<Vec<u8>, reqwest::Error> {
        let response = self.client.get(&self.feed_url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }

    fn items_from_bytes(bytes: &[u8]) -> NewsResult<Vec<RawItem>> {
        // No synthetic ids: an entry without a guid must fall back to its link
        let parser = parser::Builder::new()
            .id_generator(|_, _, _| String::new())
            .build();
        let parsed = parser
            .parse(bytes)
            .map_err(|e| NewsError::FeedParse(e.to_string()))?;
        Ok(parsed.entries.into_iter().map(entry_to_raw).collect())
    }
}

impl FeedTransport for HttpFeedTransport {
    fn fetch_feed(&self) -> NewsResult<Vec<RawItem>> {
        let bytes = self
            .download()
            .map_err(|e| NewsError::Transport(format!("{}: {}", self.feed_url, e)))?;

        let items = Self::items_from_bytes(&bytes)
            .map_err(|e| NewsError::Transport(format!("{}: {}", self.feed_url, e)))?;

        tracing::debug!(url = %self.feed_url, items = items.len(), "Fetched feed");
        Ok(items)
    }
}

fn entry_to_raw(entry: feed_rs::model::Entry) -> RawItem {
    let title = entry
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| "Untitled".to_string());

    let guid = Some(entry.id).filter(|id| !id.trim().is_empty());
    let link = entry
        .links
        .into_iter()
        .map(|l| l.href)
        .find(|href| !href.trim().is_empty());

    // Full body when present (content:encoded), otherwise the description
    let content = entry
        .content
        .and_then(|c| c.body)
        .or_else(|| entry.summary.map(|s| s.content));
    let content_snippet = content
        .as_deref()
        .map(html_to_text)
        .filter(|text| !text.is_empty());

    let iso_date = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.to_rfc3339());

    RawItem {
        guid,
        link,
        title,
        content,
        content_snippet,
        iso_date,
    }
}

/// Extract plain text from HTML content, preserving word boundaries
fn html_to_text(html: &str) -> String {
    let document = Html::parse_fragment(html);
    let mut text = String::new();

    for node in document.root_element().descendants() {
        if let Some(text_node) = node.value().as_text() {
            text.push_str(text_node);
        }
        if let Some(element) = node.value().as_element() {
            match element.name() {
                "p" | "br" | "div" | "li" => text.push(' '),
                _ => {}
            }
        }
    }

    // Collapse whitespace and trim
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One item of a feed snapshot, as handed over by a transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub guid: Option<String>,
    pub link: Option<String>,
    pub title: String,
    pub content: Option<String>,
    pub content_snippet: Option<String>,
    pub iso_date: Option<String>,
}

impl RawItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_content_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.content_snippet = Some(snippet.into());
        self
    }

    pub fn with_iso_date(mut self, iso_date: impl Into<String>) -> Self {
        self.iso_date = Some(iso_date.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Surrogate key assigned by the store; `None` until inserted.
    pub id: Option<i64>,
    pub external_id: String,
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: String,
    pub image_ref: Option<String>,
    pub is_read: bool,
    pub is_favorite: bool,
}

impl Article {
    pub fn new(external_id: String, title: String, link: String) -> Self {
        Self {
            id: None,
            external_id,
            title,
            link,
            published_at: None,
            summary: String::new(),
            image_ref: None,
            is_read: false,
            is_favorite: false,
        }
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }

    pub fn with_summary(mut self, summary: String) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_image_ref(mut self, image_ref: Option<String>) -> Self {
        self.image_ref = image_ref;
        self
    }

    pub fn with_flags(mut self, is_read: bool, is_favorite: bool) -> Self {
        self.is_read = is_read;
        self.is_favorite = is_favorite;
        self
    }
}

/// Parse an RFC 3339 publish date into UTC. Anything unparsable yields `None`.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Fixed-width UTC rendering, so that text order equals time order in storage.
pub fn format_published(published_at: &DateTime<Utc>) -> String {
    published_at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

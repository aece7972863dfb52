use serde::{Deserialize, Serialize};

use super::article::{format_published, parse_published, Article};
use crate::errors::{NewsError, NewsResult};

/// A normalized article as written to the offline snapshot file.
///
/// Field names follow the published JSON schema
/// (`id`, `titulo`, `link`, `data`, `resumo`, `imagem`, `lido`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(rename = "data", default)]
    pub published_at: Option<String>,
    #[serde(rename = "resumo", default)]
    pub summary: String,
    #[serde(rename = "imagem", default)]
    pub image_ref: Option<String>,
    #[serde(rename = "lido", default)]
    pub is_read: bool,
}

impl From<&Article> for SnapshotRecord {
    fn from(article: &Article) -> Self {
        Self {
            id: Some(article.external_id.clone()),
            title: article.title.clone(),
            link: article.link.clone(),
            published_at: article.published_at.as_ref().map(format_published),
            summary: article.summary.clone(),
            image_ref: article.image_ref.clone(),
            is_read: false,
        }
    }
}

impl SnapshotRecord {
    /// Convert back into an insertable article. `lido` is ignored: flags are
    /// never taken from an external source.
    pub fn into_article(self) -> NewsResult<Article> {
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                return Err(NewsError::Validation(format!(
                    "snapshot record '{}' has no id",
                    self.title
                )))
            }
        };

        let published_at = self.published_at.as_deref().and_then(parse_published);

        Ok(Article::new(id, self.title, self.link)
            .with_published_at(published_at)
            .with_summary(self.summary)
            .with_image_ref(self.image_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_snapshot_schema() {
        let json = r#"{
            "id": "https://agenciabrasil.ebc.com.br/educacao/noticia/1",
            "titulo": "Enem 2024",
            "link": "https://agenciabrasil.ebc.com.br/educacao/noticia/1",
            "data": "2024-03-01T10:00:00.000Z",
            "resumo": "Inscrições abertas...",
            "imagem": null,
            "lido": false
        }"#;

        let record: SnapshotRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.title, "Enem 2024");
        assert_eq!(record.summary, "Inscrições abertas...");
        assert!(record.image_ref.is_none());

        let article = record.into_article().unwrap();
        assert_eq!(
            article.external_id,
            "https://agenciabrasil.ebc.com.br/educacao/noticia/1"
        );
        assert!(article.published_at.is_some());
    }

    #[test]
    fn test_serialize_uses_portuguese_field_names() {
        let article = Article::new(
            "g1".to_string(),
            "Title".to_string(),
            "https://x/y".to_string(),
        )
        .with_flags(true, true);

        let value = serde_json::to_value(SnapshotRecord::from(&article)).unwrap();
        assert_eq!(value["titulo"], "Title");
        assert_eq!(value["lido"], false);
        assert!(value["data"].is_null());
        assert!(value.get("title").is_none());
    }

    #[test]
    fn test_lido_is_not_carried_into_article() {
        let record = SnapshotRecord {
            id: Some("g1".to_string()),
            title: "Title".to_string(),
            link: String::new(),
            published_at: None,
            summary: String::new(),
            image_ref: None,
            is_read: true,
        };
        assert!(!record.into_article().unwrap().is_read);
    }

    #[test]
    fn test_blank_id_is_rejected() {
        let record: SnapshotRecord =
            serde_json::from_str(r#"{"id": "  ", "titulo": "x"}"#).unwrap();
        assert!(matches!(record.into_article(), Err(NewsError::Validation(_))));
    }

    #[test]
    fn test_missing_or_null_id_still_deserializes() {
        let records: Vec<SnapshotRecord> =
            serde_json::from_str(r#"[{"titulo": "Sem id"}, {"id": null, "titulo": "Nulo"}]"#)
                .unwrap();

        assert_eq!(records.len(), 2);
        for record in records {
            assert!(record.id.is_none());
            assert!(matches!(record.into_article(), Err(NewsError::Validation(_))));
        }
    }
}

use super::{Article, ArticleFilter, Flag, ReadingStats};

/// In-memory, ordered copy of the store that a UI renders from.
///
/// Flag changes made through the flag service are mirrored here with
/// [`ArticleView::apply_flag`] so the list does not need to be reloaded.
#[derive(Debug, Clone, Default)]
pub struct ArticleView {
    articles: Vec<Article>,
}

impl ArticleView {
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Returns false when no article with that external id is in view.
    pub fn apply_flag(&mut self, external_id: &str, flag: Flag, value: bool) -> bool {
        match self
            .articles
            .iter_mut()
            .find(|a| a.external_id == external_id)
        {
            Some(article) => {
                flag.set(article, value);
                true
            }
            None => false,
        }
    }

    pub fn filtered(&self, filter: ArticleFilter) -> Vec<&Article> {
        self.articles.iter().filter(|a| filter.matches(a)).collect()
    }

    pub fn stats(&self) -> ReadingStats {
        ReadingStats {
            total: self.articles.len(),
            read: self.articles.iter().filter(|a| a.is_read).count(),
            favorites: self.articles.iter().filter(|a| a.is_favorite).count(),
        }
    }
}

use crate::domain::{Article, ArticleView, Flag, FlagUpdate};
use crate::errors::{NewsError, NewsResult};
use crate::storage::traits::ArticleRepository;

/// Read/favorite toggles. Works against the store directly and never waits
/// on a sync.
pub struct FlagService<R: ArticleRepository> {
    repository: R,
}

impl<R: ArticleRepository> FlagService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Flip the read flag and return its new value
    pub fn toggle_read(&self, external_id: &str) -> NewsResult<bool> {
        self.toggle(external_id, Flag::Read)
    }

    /// Flip the favorite flag and return its new value
    pub fn toggle_favorite(&self, external_id: &str) -> NewsResult<bool> {
        self.toggle(external_id, Flag::Favorite)
    }

    pub fn toggle(&self, external_id: &str, flag: Flag) -> NewsResult<bool> {
        let value = self.repository.toggle_flag(external_id, flag)?;
        tracing::debug!(%external_id, %flag, value, "Flag toggled");
        Ok(value)
    }

    /// Toggle and mirror the new value into an in-memory view.
    pub fn toggle_in_view(
        &self,
        view: &mut ArticleView,
        external_id: &str,
        flag: Flag,
    ) -> NewsResult<bool> {
        let value = self.toggle(external_id, flag)?;
        view.apply_flag(external_id, flag, value);
        Ok(value)
    }

    /// Set flags explicitly; unnamed flags keep their value.
    pub fn set_flags(&self, external_id: &str, update: FlagUpdate) -> NewsResult<Article> {
        let article = self
            .repository
            .find_by_external_id(external_id)?
            .ok_or_else(|| NewsError::NotFound(external_id.to_string()))?;
        let id = article
            .id
            .ok_or_else(|| NewsError::NotFound(external_id.to_string()))?;

        self.repository.update_flags(id, update)?;

        self.repository
            .get_by_id(id)?
            .ok_or_else(|| NewsError::NotFound(external_id.to_string()))
    }
}

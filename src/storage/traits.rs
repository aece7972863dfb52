use crate::domain::{Article, ArticleFilter, Flag, FlagUpdate, ReadingStats};
use crate::errors::NewsResult;

/// Durable article collection, keyed by surrogate id with a lookup on the
/// feed's external id.
#[cfg_attr(test, mockall::automock)]
pub trait ArticleRepository: Send + Sync {
    fn find_by_external_id(&self, external_id: &str) -> NewsResult<Option<Article>>;
    fn get_by_id(&self, id: i64) -> NewsResult<Option<Article>>;

    /// Insert a new article and return its surrogate id. Fails with
    /// `Constraint` if the external id is already stored.
    fn insert(&self, article: &Article) -> NewsResult<i64>;

    /// Update only the flags named in `update`. Fails with `NotFound` for an
    /// unknown id.
    fn update_flags(&self, id: i64, update: FlagUpdate) -> NewsResult<()>;

    /// Negate one flag in a single statement and return its new value.
    fn toggle_flag(&self, external_id: &str, flag: Flag) -> NewsResult<bool>;

    /// Most recent first; undated articles last; ties by surrogate id.
    fn list_all(&self) -> NewsResult<Vec<Article>>;
    fn list_filtered(&self, filter: ArticleFilter) -> NewsResult<Vec<Article>>;
    fn stats(&self) -> NewsResult<ReadingStats>;
}

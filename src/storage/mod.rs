pub mod traits;
pub mod sqlite;

pub use traits::ArticleRepository;
pub use sqlite::{SqliteArticleRepository, SqliteStorage};

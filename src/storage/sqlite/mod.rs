mod connection;
mod article_repository;

pub use connection::SqliteStorage;
pub use article_repository::SqliteArticleRepository;

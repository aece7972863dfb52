use rusqlite::{ErrorCode, OptionalExtension, Row};

use crate::domain::{
    format_published, parse_published, Article, ArticleFilter, Flag, FlagUpdate, ReadingStats,
};
use crate::errors::{NewsError, NewsResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::ArticleRepository;

const SELECT_COLUMNS: &str = "SELECT id, external_id, title, link, published_at, summary, \
     image_ref, is_read, is_favorite FROM articles";

// Undated articles sort after dated ones; equal timestamps keep insertion order.
const ORDER_BY: &str = "ORDER BY published_at IS NULL, published_at DESC, id ASC";

pub struct SqliteArticleRepository {
    storage: SqliteStorage,
}

impl SqliteArticleRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn query_list(&self, filter: ArticleFilter) -> NewsResult<Vec<Article>> {
        let conn = self.storage.connection()?;
        let query = format!("{} {} {}", SELECT_COLUMNS, filter_clause(filter), ORDER_BY);
        let mut stmt = conn.prepare(&query)?;

        let articles = stmt.query_map([], row_to_article)?;

        articles.collect::<Result<Vec<_>, _>>().map_err(NewsError::from)
    }
}

fn filter_clause(filter: ArticleFilter) -> &'static str {
    match filter {
        ArticleFilter::Unread => "WHERE is_read = 0",
        ArticleFilter::Read => "WHERE is_read = 1",
        ArticleFilter::Favorites => "WHERE is_favorite = 1",
        ArticleFilter::All => "",
    }
}

fn flag_column(flag: Flag) -> &'static str {
    match flag {
        Flag::Read => "is_read",
        Flag::Favorite => "is_favorite",
    }
}

fn row_to_article(row: &Row<'_>) -> rusqlite::Result<Article> {
    let published_at: Option<String> = row.get(4)?;

    Ok(Article {
        id: Some(row.get(0)?),
        external_id: row.get(1)?,
        title: row.get(2)?,
        link: row.get(3)?,
        published_at: published_at.as_deref().and_then(parse_published),
        summary: row.get(5)?,
        image_ref: row.get(6)?,
        is_read: row.get(7)?,
        is_favorite: row.get(8)?,
    })
}

impl ArticleRepository for SqliteArticleRepository {
    fn find_by_external_id(&self, external_id: &str) -> NewsResult<Option<Article>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!("{} WHERE external_id = ?1", SELECT_COLUMNS))?;

        Ok(stmt.query_row([external_id], row_to_article).optional()?)
    }

    fn get_by_id(&self, id: i64) -> NewsResult<Option<Article>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", SELECT_COLUMNS))?;

        Ok(stmt.query_row([id], row_to_article).optional()?)
    }

    fn insert(&self, article: &Article) -> NewsResult<i64> {
        let conn = self.storage.connection()?;

        // Check within the same connection guard so the check and the insert
        // cannot interleave with another writer.
        let mut stmt =
            conn.prepare("SELECT EXISTS(SELECT 1 FROM articles WHERE external_id = ?1)")?;
        let exists: bool = stmt.query_row([&article.external_id], |row| row.get(0))?;
        drop(stmt);

        if exists {
            return Err(NewsError::Constraint(article.external_id.clone()));
        }

        let published_at = article.published_at.as_ref().map(format_published);
        let result = conn.execute(
            "INSERT INTO articles
                (external_id, title, link, published_at, summary, image_ref, is_read, is_favorite)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            (
                &article.external_id,
                &article.title,
                &article.link,
                &published_at,
                &article.summary,
                &article.image_ref,
                article.is_read,
                article.is_favorite,
            ),
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(NewsError::Constraint(article.external_id.clone()))
            }
            Err(e) => Err(NewsError::from(e)),
        }
    }

    fn update_flags(&self, id: i64, update: FlagUpdate) -> NewsResult<()> {
        let conn = self.storage.connection()?;
        let changed = conn.execute(
            "UPDATE articles
             SET is_read = COALESCE(?1, is_read), is_favorite = COALESCE(?2, is_favorite)
             WHERE id = ?3",
            (update.is_read, update.is_favorite, id),
        )?;

        if changed == 0 {
            return Err(NewsError::NotFound(format!("id {}", id)));
        }
        Ok(())
    }

    fn toggle_flag(&self, external_id: &str, flag: Flag) -> NewsResult<bool> {
        let column = flag_column(flag);
        let conn = self.storage.connection()?;
        let query = format!(
            "UPDATE articles SET {col} = NOT {col} WHERE external_id = ?1 RETURNING {col}",
            col = column
        );

        let value: Option<bool> = conn
            .query_row(&query, [external_id], |row| row.get(0))
            .optional()?;

        value.ok_or_else(|| NewsError::NotFound(external_id.to_string()))
    }

    fn list_all(&self) -> NewsResult<Vec<Article>> {
        self.query_list(ArticleFilter::All)
    }

    fn list_filtered(&self, filter: ArticleFilter) -> NewsResult<Vec<Article>> {
        self.query_list(filter)
    }

    fn stats(&self) -> NewsResult<ReadingStats> {
        let conn = self.storage.connection()?;
        let (total, read, favorites): (i64, i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_read), 0), COALESCE(SUM(is_favorite), 0)
             FROM articles",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(ReadingStats {
            total: total as usize,
            read: read as usize,
            favorites: favorites as usize,
        })
    }
}

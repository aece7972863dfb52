use serde::{Deserialize, Serialize};

use super::Article;

/// A user-set boolean attribute of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    Read,
    Favorite,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Read => "read",
            Flag::Favorite => "favorite",
        }
    }

    pub fn set(&self, article: &mut Article, value: bool) {
        match self {
            Flag::Read => article.is_read = value,
            Flag::Favorite => article.is_favorite = value,
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Partial flag update; `None` leaves the flag untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagUpdate {
    pub is_read: Option<bool>,
    pub is_favorite: Option<bool>,
}

impl FlagUpdate {
    pub fn read(value: bool) -> Self {
        Self {
            is_read: Some(value),
            ..Self::default()
        }
    }

    pub fn favorite(value: bool) -> Self {
        Self {
            is_favorite: Some(value),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleFilter {
    #[default]
    Unread,
    Read,
    Favorites,
    All,
}

impl ArticleFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleFilter::Unread => "unread",
            ArticleFilter::Read => "read",
            ArticleFilter::Favorites => "favorites",
            ArticleFilter::All => "all",
        }
    }

    pub fn matches(&self, article: &Article) -> bool {
        match self {
            ArticleFilter::Unread => !article.is_read,
            ArticleFilter::Read => article.is_read,
            ArticleFilter::Favorites => article.is_favorite,
            ArticleFilter::All => true,
        }
    }
}

impl std::str::FromStr for ArticleFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unread" | "inicio" => Ok(ArticleFilter::Unread),
            "read" | "lidos" => Ok(ArticleFilter::Read),
            "favorites" | "favorite" | "favoritos" => Ok(ArticleFilter::Favorites),
            "all" => Ok(ArticleFilter::All),
            _ => Err(format!("Unknown filter: {}", s)),
        }
    }
}

impl std::fmt::Display for ArticleFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

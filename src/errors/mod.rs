use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    // Sync errors
    #[error("Feed unreachable: {0}")]
    Transport(String),

    #[error("Invalid feed item: {0}")]
    Validation(String),

    #[error("Duplicate article: {0}")]
    Constraint(String),

    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("A sync is already in progress")]
    SyncInProgress,

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Parsing errors
    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    #[error("Snapshot parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl NewsError {
    /// True for failures that mean "the feed could not be fetched", which the
    /// caller should surface as an offline/stale state rather than a crash.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            NewsError::Transport(_) | NewsError::Http(_) | NewsError::FeedParse(_)
        )
    }
}

pub type NewsResult<T> = Result<T, NewsError>;

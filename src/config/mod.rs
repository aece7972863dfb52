use std::path::PathBuf;
use std::time::Duration;

use crate::domain::Profile;
use crate::errors::{NewsError, NewsResult};

pub const DEFAULT_FEED_URL: &str = "http://agenciabrasil.ebc.com.br/rss/educacao/feed.xml";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub db_path: String,
    pub snapshot_path: PathBuf,
    pub http_timeout: Duration,
    pub profile: Profile,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> NewsResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        let feed_url =
            std::env::var("NEWSROOM_FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());
        url::Url::parse(&feed_url)
            .map_err(|e| NewsError::Config(format!("NEWSROOM_FEED_URL: {}", e)))?;

        // Default paths are relative to executable directory
        let db_path = std::env::var("NEWSROOM_DB_PATH").unwrap_or_else(|_| {
            exe_dir
                .as_ref()
                .map(|d| d.join("newsroom.db").to_string_lossy().into_owned())
                .unwrap_or_else(|| "./newsroom.db".to_string())
        });

        let snapshot_path = std::env::var("NEWSROOM_SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                exe_dir
                    .as_ref()
                    .map(|d| d.join("noticias.json"))
                    .unwrap_or_else(|| PathBuf::from("./noticias.json"))
            });

        let http_timeout = match std::env::var("NEWSROOM_HTTP_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let mut profile = Profile::default();
        if let Ok(name) = std::env::var("NEWSROOM_PROFILE_NAME") {
            profile.name = name;
        }
        if let Ok(subject) = std::env::var("NEWSROOM_PROFILE_SUBJECT") {
            profile.subject = subject;
        }

        Ok(Self {
            feed_url,
            db_path,
            snapshot_path,
            http_timeout,
            profile,
        })
    }
}

fn parse_timeout(raw: &str) -> NewsResult<Duration> {
    let secs: u64 = raw.trim().parse().map_err(|_| {
        NewsError::Config(format!("NEWSROOM_HTTP_TIMEOUT_SECS must be a number, got '{}'", raw))
    })?;
    if secs == 0 {
        return Err(NewsError::Config(
            "NEWSROOM_HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

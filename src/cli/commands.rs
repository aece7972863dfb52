use clap::{Parser, Subcommand};

use crate::domain::ArticleFilter;

#[derive(Parser)]
#[command(name = "newsroom")]
#[command(about = "Offline-first news reader with read and favorite tracking")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the feed and store new articles
    Sync,

    /// List stored articles, newest first
    List {
        /// Which articles to show: unread, read, favorites or all
        #[arg(short, long, default_value = "unread")]
        filter: ArticleFilter,
    },

    /// Toggle the read flag of an article
    Read {
        /// External id of the article (feed guid or link)
        id: String,
    },

    /// Toggle the favorite flag of an article
    Favorite {
        /// External id of the article (feed guid or link)
        id: String,
    },

    /// Fetch the feed and write an offline snapshot file
    Collect {
        /// Output file path (defaults to NEWSROOM_SNAPSHOT_PATH)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Load a snapshot file into the local store
    Import {
        /// Path to the snapshot file (defaults to NEWSROOM_SNAPSHOT_PATH)
        path: Option<String>,
    },

    /// Show the reader profile and reading statistics
    Profile,

    /// Sync now and again every time the network comes back
    Watch {
        /// Seconds between connectivity checks
        #[arg(short, long, default_value_t = 30)]
        interval: u64,
    },
}

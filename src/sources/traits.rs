use crate::domain::RawItem;
use crate::errors::NewsResult;

/// Supplies the current feed snapshot.
#[cfg_attr(test, mockall::automock)]
pub trait FeedTransport: Send + Sync {
    /// Fetch every item currently in the feed. Any failure is reported as
    /// `NewsError::Transport`.
    fn fetch_feed(&self) -> NewsResult<Vec<RawItem>>;
}

/// Reports whether the network is currently reachable.
#[cfg_attr(test, mockall::automock)]
pub trait ConnectivityObserver: Send + Sync {
    fn is_online(&self) -> bool;
}

pub mod traits;
pub mod rss;
pub mod snapshot;
pub mod connectivity;

pub use traits::{ConnectivityObserver, FeedTransport};
pub use rss::HttpFeedTransport;
pub use snapshot::SnapshotFile;
pub use connectivity::TcpReachability;

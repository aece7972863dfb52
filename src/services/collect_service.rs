use crate::domain::SnapshotRecord;
use crate::errors::NewsResult;
use crate::normalize::normalize;
use crate::sources::snapshot::SnapshotFile;
use crate::sources::traits::FeedTransport;

/// Offline collection step: fetch the live feed and write it out as a
/// snapshot file for clients to load before their first sync.
pub struct CollectService<T: FeedTransport> {
    transport: T,
}

impl<T: FeedTransport> CollectService<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Fetch and normalize; items without identity are dropped.
    pub fn snapshot(&self) -> NewsResult<Vec<SnapshotRecord>> {
        let items = self.transport.fetch_feed()?;

        let records = items
            .into_iter()
            .filter_map(|item| match normalize(item) {
                Ok(article) => Some(SnapshotRecord::from(&article)),
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping item from snapshot");
                    None
                }
            })
            .collect();

        Ok(records)
    }

    /// Returns the number of records written.
    pub fn collect(&self, file: &SnapshotFile) -> NewsResult<usize> {
        let records = self.snapshot()?;
        file.write(&records)?;
        tracing::info!(path = %file.path().display(), records = records.len(), "Snapshot written");
        Ok(records.len())
    }
}

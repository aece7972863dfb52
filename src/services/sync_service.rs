use std::sync::{Mutex, MutexGuard, TryLockError};

use crate::domain::{Article, SnapshotRecord};
use crate::errors::{NewsError, NewsResult};
use crate::normalize::normalize;
use crate::sources::traits::FeedTransport;
use crate::storage::traits::ArticleRepository;

/// Outcome of one merge. `invalid` and `failed` items are also counted in
/// `skipped`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncResult {
    pub added: usize,
    pub skipped: usize,
    /// Items with no usable identity.
    pub invalid: usize,
    /// Items the store could not look up or insert.
    pub failed: usize,
}

/// Fetches the feed, normalizes it and merges new articles into the store.
///
/// Existing articles are never modified by a sync, so read/favorite flags
/// survive any number of re-syncs. Only one sync (or snapshot import) runs
/// at a time; a concurrent call fails with [`NewsError::SyncInProgress`].
pub struct SyncService<R: ArticleRepository, T: FeedTransport> {
    repository: R,
    transport: T,
    in_flight: Mutex<()>,
}

impl<R: ArticleRepository, T: FeedTransport> SyncService<R, T> {
    pub fn new(repository: R, transport: T) -> Self {
        Self {
            repository,
            transport,
            in_flight: Mutex::new(()),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn sync(&self) -> NewsResult<SyncResult> {
        let _guard = self.acquire()?;

        let items = self.transport.fetch_feed().map_err(|e| {
            tracing::warn!(error = %e, "Feed fetch failed, store left unchanged");
            match e {
                NewsError::Transport(_) => e,
                other => NewsError::Transport(other.to_string()),
            }
        })?;

        let result = self.merge(items.into_iter().map(normalize));
        tracing::info!(
            added = result.added,
            skipped = result.skipped,
            invalid = result.invalid,
            failed = result.failed,
            "Sync complete"
        );
        Ok(result)
    }

    /// Merge records from an offline snapshot through the same path as a sync.
    pub fn import_snapshot(&self, records: Vec<SnapshotRecord>) -> NewsResult<SyncResult> {
        let _guard = self.acquire()?;

        let result = self.merge(records.into_iter().map(SnapshotRecord::into_article));
        tracing::info!(
            added = result.added,
            skipped = result.skipped,
            "Snapshot import complete"
        );
        Ok(result)
    }

    fn acquire(&self) -> NewsResult<MutexGuard<'_, ()>> {
        match self.in_flight.try_lock() {
            Ok(guard) => Ok(guard),
            // A panicked sync leaves nothing half-held; the lock is reusable
            Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => Err(NewsError::SyncInProgress),
        }
    }

    /// Per-item failures are logged and counted; they never abort the batch.
    fn merge<I>(&self, candidates: I) -> SyncResult
    where
        I: IntoIterator<Item = NewsResult<Article>>,
    {
        let mut result = SyncResult::default();

        for candidate in candidates {
            let article = match candidate {
                Ok(article) => article,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping invalid feed item");
                    result.skipped += 1;
                    result.invalid += 1;
                    continue;
                }
            };

            match self.repository.find_by_external_id(&article.external_id) {
                Ok(None) => {}
                Ok(Some(_)) => {
                    tracing::debug!(external_id = %article.external_id, "Already stored");
                    result.skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(
                        external_id = %article.external_id,
                        error = %e,
                        "Lookup failed"
                    );
                    result.skipped += 1;
                    result.failed += 1;
                    continue;
                }
            }

            // Flags always start cleared on the sync path
            let article = article.with_flags(false, false);
            match self.repository.insert(&article) {
                Ok(id) => {
                    tracing::debug!(external_id = %article.external_id, id, "Inserted");
                    result.added += 1;
                }
                Err(NewsError::Constraint(external_id)) => {
                    tracing::warn!(%external_id, "Duplicate rejected by store");
                    result.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        external_id = %article.external_id,
                        error = %e,
                        "Insert failed"
                    );
                    result.skipped += 1;
                    result.failed += 1;
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Flag, RawItem};
    use crate::sources::traits::MockFeedTransport;
    use crate::storage::sqlite::{SqliteArticleRepository, SqliteStorage};
    use crate::storage::traits::MockArticleRepository;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;

    fn feed() -> Vec<RawItem> {
        vec![
            RawItem::new("Jan")
                .with_guid("g-jan")
                .with_link("https://x/jan")
                .with_iso_date("2024-01-01T00:00:00Z"),
            RawItem::new("Mar")
                .with_guid("g-mar")
                .with_link("https://x/mar")
                .with_iso_date("2024-03-01T00:00:00Z"),
            RawItem::new("Feb")
                .with_link("https://x/feb")
                .with_iso_date("2024-02-01T00:00:00Z"),
        ]
    }

    fn transport_returning(items: Vec<RawItem>) -> MockFeedTransport {
        let mut transport = MockFeedTransport::new();
        transport
            .expect_fetch_feed()
            .returning(move || Ok(items.clone()));
        transport
    }

    fn setup(
        items: Vec<RawItem>,
    ) -> (
        SqliteStorage,
        SyncService<SqliteArticleRepository, MockFeedTransport>,
    ) {
        let storage = SqliteStorage::in_memory().unwrap();
        let repo = SqliteArticleRepository::new(storage.clone());
        (storage, SyncService::new(repo, transport_returning(items)))
    }

    #[test]
    fn test_first_sync_inserts_everything() {
        let (_, service) = setup(feed());

        let result = service.sync().unwrap();
        assert_eq!(
            result,
            SyncResult {
                added: 3,
                skipped: 0,
                invalid: 0,
                failed: 0
            }
        );

        let ids: Vec<String> = service
            .repository()
            .list_all()
            .unwrap()
            .into_iter()
            .map(|a| a.external_id)
            .collect();
        assert_eq!(ids, vec!["g-mar", "https://x/feb", "g-jan"]);
    }

    #[test]
    fn test_second_sync_is_idempotent() {
        let (_, service) = setup(feed());

        service.sync().unwrap();
        let second = service.sync().unwrap();

        assert_eq!(second.added, 0);
        assert_eq!(second.skipped, 3);
        assert_eq!(service.repository().list_all().unwrap().len(), 3);
    }

    #[test]
    fn test_resync_preserves_flags() {
        let (storage, service) = setup(feed());
        service.sync().unwrap();

        let repo = SqliteArticleRepository::new(storage);
        assert!(repo.toggle_flag("g-jan", Flag::Read).unwrap());
        assert!(repo.toggle_flag("g-mar", Flag::Favorite).unwrap());

        service.sync().unwrap();

        let jan = repo.find_by_external_id("g-jan").unwrap().unwrap();
        let mar = repo.find_by_external_id("g-mar").unwrap().unwrap();
        assert!(jan.is_read);
        assert!(mar.is_favorite);
    }

    #[test]
    fn test_resync_does_not_correct_existing_fields() {
        let storage = SqliteStorage::in_memory().unwrap();
        let mut transport = MockFeedTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_fetch_feed()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![RawItem::new("Original").with_guid("g1")]));
        transport
            .expect_fetch_feed()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![RawItem::new("Edited").with_guid("g1")]));

        let service = SyncService::new(SqliteArticleRepository::new(storage), transport);
        service.sync().unwrap();
        service.sync().unwrap();

        let stored = service.repository().find_by_external_id("g1").unwrap().unwrap();
        assert_eq!(stored.title, "Original");
    }

    #[test]
    fn test_malformed_item_is_contained() {
        let items = vec![
            RawItem::new("One").with_guid("g1"),
            RawItem::new("No identity"),
            RawItem::new("Three").with_link("https://x/3"),
        ];
        let (_, service) = setup(items);

        let result = service.sync().unwrap();
        assert_eq!(result.added, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.invalid, 1);
    }

    #[test]
    fn test_duplicates_within_one_snapshot_are_merged() {
        let items = vec![
            RawItem::new("One").with_guid("g1"),
            RawItem::new("One again").with_guid("g1"),
        ];
        let (_, service) = setup(items);

        let result = service.sync().unwrap();
        assert_eq!(result.added, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(service.repository().list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_transport_failure_leaves_store_untouched() {
        let storage = SqliteStorage::in_memory().unwrap();
        let repo = SqliteArticleRepository::new(storage.clone());
        repo.insert(&Article::new(
            "kept".to_string(),
            "Kept".to_string(),
            "https://x/kept".to_string(),
        ))
        .unwrap();

        let mut transport = MockFeedTransport::new();
        transport
            .expect_fetch_feed()
            .returning(|| Err(NewsError::Transport("connection refused".to_string())));

        let service = SyncService::new(repo, transport);
        let result = service.sync();
        assert!(matches!(result, Err(NewsError::Transport(_))));

        // Local reads still work
        let all = service.repository().list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].external_id, "kept");
    }

    #[test]
    fn test_non_transport_fetch_error_is_reported_as_transport() {
        let mut transport = MockFeedTransport::new();
        transport
            .expect_fetch_feed()
            .returning(|| Err(NewsError::FeedParse("bad xml".to_string())));

        let service = SyncService::new(MockArticleRepository::new(), transport);
        assert!(matches!(service.sync(), Err(NewsError::Transport(_))));
    }

    #[test]
    fn test_store_constraint_counts_as_skip() {
        let mut repo = MockArticleRepository::new();
        repo.expect_find_by_external_id().returning(|_| Ok(None));
        repo.expect_insert()
            .returning(|a| Err(NewsError::Constraint(a.external_id.clone())));

        let items = vec![RawItem::new("x").with_guid("g1")];
        let service = SyncService::new(repo, transport_returning(items));
        let result = service.sync().unwrap();
        assert_eq!(result.added, 0);
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_store_failures_are_counted_not_fatal() {
        let mut repo = MockArticleRepository::new();
        repo.expect_find_by_external_id()
            .withf(|id| id == "g-mar")
            .returning(|_| Err(NewsError::Database(rusqlite::Error::InvalidQuery)));
        repo.expect_find_by_external_id().returning(|_| Ok(None));

        let mut seq = mockall::Sequence::new();
        repo.expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(1));
        repo.expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(NewsError::Database(rusqlite::Error::InvalidQuery)));

        let service = SyncService::new(repo, transport_returning(feed()));
        let result = service.sync().unwrap();

        assert_eq!(
            result,
            SyncResult {
                added: 1,
                skipped: 2,
                invalid: 0,
                failed: 2
            }
        );
    }

    #[test]
    fn test_inserted_articles_never_carry_flags() {
        let mut repo = MockArticleRepository::new();
        repo.expect_find_by_external_id().returning(|_| Ok(None));
        repo.expect_insert()
            .withf(|a| !a.is_read && !a.is_favorite)
            .times(3)
            .returning(|_| Ok(1));

        let service = SyncService::new(repo, transport_returning(feed()));
        assert_eq!(service.sync().unwrap().added, 3);
    }

    #[test]
    fn test_import_snapshot_merges_and_skips_blank_ids() {
        let (_, service) = setup(feed());
        service.sync().unwrap();

        let records: Vec<SnapshotRecord> = serde_json::from_str(
            r#"[
                {"id": "g-jan", "titulo": "Jan", "link": "https://x/jan", "lido": true},
                {
                    "id": "g-apr",
                    "titulo": "Apr",
                    "link": "https://x/apr",
                    "data": "2024-04-01T00:00:00.000Z",
                    "resumo": "Abril...",
                    "imagem": "https://img/apr.jpg",
                    "lido": true
                },
                {"id": "", "titulo": "Broken", "link": "", "lido": false}
            ]"#,
        )
        .unwrap();

        let result = service.import_snapshot(records).unwrap();
        assert_eq!(result.added, 1);
        assert_eq!(result.skipped, 2);
        assert_eq!(result.invalid, 1);

        let apr = service
            .repository()
            .find_by_external_id("g-apr")
            .unwrap()
            .unwrap();
        assert_eq!(apr.summary, "Abril...");
        assert_eq!(apr.image_ref.as_deref(), Some("https://img/apr.jpg"));
        assert!(!apr.is_read, "snapshot flags are ignored");
        assert_eq!(service.repository().list_all().unwrap()[0].external_id, "g-apr");
    }

    #[test]
    fn test_import_snapshot_record_without_id_is_skipped() {
        let (_, service) = setup(Vec::new());

        let records: Vec<SnapshotRecord> = serde_json::from_str(
            r#"[
                {"id": "g1", "titulo": "Valida", "link": "https://x/1", "lido": false},
                {"titulo": "Sem id"}
            ]"#,
        )
        .unwrap();

        let result = service.import_snapshot(records).unwrap();
        assert_eq!(
            result,
            SyncResult {
                added: 1,
                skipped: 1,
                invalid: 1,
                failed: 0
            }
        );
        assert_eq!(service.repository().list_all().unwrap().len(), 1);
    }

    struct BlockingTransport {
        started: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl FeedTransport for BlockingTransport {
        fn fetch_feed(&self) -> NewsResult<Vec<RawItem>> {
            self.started.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            Ok(vec![RawItem::new("Only").with_guid("g1")])
        }
    }

    #[test]
    fn test_concurrent_sync_is_rejected() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let transport = BlockingTransport {
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
        };

        let storage = SqliteStorage::in_memory().unwrap();
        let service = Arc::new(SyncService::new(
            SqliteArticleRepository::new(storage.clone()),
            transport,
        ));

        let background = {
            let service = Arc::clone(&service);
            thread::spawn(move || service.sync())
        };

        started_rx.recv().unwrap();
        assert!(matches!(service.sync(), Err(NewsError::SyncInProgress)));
        assert!(matches!(
            service.import_snapshot(Vec::new()),
            Err(NewsError::SyncInProgress)
        ));

        // Flag toggles and reads are not blocked by the in-flight sync
        let repo = SqliteArticleRepository::new(storage);
        assert!(repo.list_all().unwrap().is_empty());

        release_tx.send(()).unwrap();
        let result = background.join().unwrap().unwrap();
        assert_eq!(result.added, 1);

        // The guard is released once the first sync finishes
        release_tx.send(()).unwrap();
        assert_eq!(service.sync().unwrap().skipped, 1);
    }
}

//! Progress reconciliation
//!
//! [`ProgressReducer`] is the sole mutation gateway for watch records. Every
//! update re-derives the metric fields from the canonical interval set, and
//! every write goes through a compare-and-swap loop so concurrent reports for
//! the same (viewer, video) pair cannot drop each other's coverage.

use std::sync::Arc;

use chrono::Utc;
use rewind_model::{
    UpdateProgressRequest, Video, VideoID, ViewerID, ViewerProgressEntry, WatchRecord,
};
use tracing::{debug, warn};

use crate::error::{ProgressError, Result};
use crate::intervals;
use crate::store::ports::{VideoCatalog, WatchRecordStore};

/// Upper bound on compare-and-swap retries before a conflict is surfaced as a
/// transient failure.
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Owns merge + persistence of [`WatchRecord`]s.
pub struct ProgressReducer {
    store: Arc<dyn WatchRecordStore>,
    catalog: Arc<dyn VideoCatalog>,
}

impl std::fmt::Debug for ProgressReducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReducer").finish_non_exhaustive()
    }
}

impl ProgressReducer {
    pub fn new(store: Arc<dyn WatchRecordStore>, catalog: Arc<dyn VideoCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Resolve `video_id` against the catalog, or fail with `VideoNotFound`.
    async fn require_video(&self, video_id: VideoID) -> Result<Video> {
        self.catalog
            .lookup(video_id)
            .await?
            .ok_or(ProgressError::VideoNotFound(video_id))
    }

    /// Return the record for a (viewer, video) pair, creating it with
    /// default (empty) fields on first access.
    pub async fn get_or_create(
        &self,
        viewer_id: ViewerID,
        video_id: VideoID,
    ) -> Result<WatchRecord> {
        self.require_video(video_id).await?;

        for _ in 0..MAX_WRITE_ATTEMPTS {
            if let Some(existing) = self.store.load(viewer_id, video_id).await? {
                return Ok(existing.record);
            }
            let record = WatchRecord::new(viewer_id, video_id);
            match self.store.store(record.clone(), None).await {
                Ok(_) => {
                    debug!(%viewer_id, %video_id, "created watch record");
                    return Ok(record);
                }
                // Lost the creation race; the next load sees the winner.
                Err(ProgressError::WriteConflict { .. }) => continue,
                Err(err) => return Err(err),
            }
        }

        Err(ProgressError::WriteConflict {
            viewer_id,
            video_id,
        })
    }

    /// All progress records for a viewer, joined with catalog metadata.
    pub async fn list_for_viewer(&self, viewer_id: ViewerID) -> Result<Vec<ViewerProgressEntry>> {
        let records = self.store.list_for_viewer(viewer_id).await?;
        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            match self.catalog.lookup(record.video_id).await? {
                Some(video) => entries.push(ViewerProgressEntry {
                    record,
                    title: video.title,
                    thumbnail: video.thumbnail,
                    duration_seconds: video.duration_seconds,
                }),
                None => {
                    // Video was removed from the catalog after progress was
                    // recorded; the orphaned record is not worth erroring on.
                    warn!(%viewer_id, video_id = %record.video_id, "skipping progress for unknown video");
                }
            }
        }
        Ok(entries)
    }

    /// Apply one progress update, per the two update modes:
    ///
    /// - a non-empty interval batch merges into the canonical set and
    ///   re-derives all metrics (and takes `current_time` if present);
    /// - otherwise a bare `current_time` (zero included) moves only the
    ///   resume position;
    /// - an empty update leaves the record as-is.
    ///
    /// The record is created on first access either way.
    pub async fn apply_update(
        &self,
        viewer_id: ViewerID,
        video_id: VideoID,
        update: UpdateProgressRequest,
    ) -> Result<WatchRecord> {
        let video = self.require_video(video_id).await?;

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let loaded = self.store.load(viewer_id, video_id).await?;
            let (mut record, expected_version) = match loaded {
                Some(versioned) => (versioned.record, Some(versioned.version)),
                None => (WatchRecord::new(viewer_id, video_id), None),
            };

            if !update.intervals.is_empty() {
                let mut combined = record.intervals.clone();
                combined.extend_from_slice(&update.intervals);
                // Fails before any mutation is persisted, so a malformed
                // batch cannot corrupt the stored record.
                let merged = intervals::merge(&combined)?;
                let total = intervals::total_watched_seconds(&merged);
                let percentage =
                    intervals::progress_percentage(total, video.duration_seconds)?;

                record.intervals = merged;
                record.total_watched_seconds = total;
                record.progress_percentage = percentage;
                record.completed = intervals::is_completed(percentage);
                if let Some(position) = update.current_time {
                    record.last_position = position;
                }
                record.last_watched = Utc::now();
            } else if let Some(position) = update.current_time {
                // Position-only heartbeat: intervals and metrics untouched.
                record.last_position = position;
                record.last_watched = Utc::now();
            } else if expected_version.is_some() {
                // Nothing to do and the record already exists.
                return Ok(record);
            }

            match self.store.store(record.clone(), expected_version).await {
                Ok(version) => {
                    debug!(
                        %viewer_id,
                        %video_id,
                        version,
                        total_watched = record.total_watched_seconds,
                        percentage = record.progress_percentage,
                        "stored watch record"
                    );
                    return Ok(record);
                }
                Err(ProgressError::WriteConflict { .. }) => {
                    debug!(%viewer_id, %video_id, attempt, "write conflict, retrying merge");
                    continue;
                }
                Err(err) => return Err(err),
            }
        }

        Err(ProgressError::WriteConflict {
            viewer_id,
            video_id,
        })
    }

    /// Restore a record to its creation defaults.
    ///
    /// Unlike [`Self::apply_update`] this never creates a record: resetting
    /// progress that was never tracked is `RecordNotFound`.
    pub async fn reset(&self, viewer_id: ViewerID, video_id: VideoID) -> Result<WatchRecord> {
        self.require_video(video_id).await?;

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let Some(versioned) = self.store.load(viewer_id, video_id).await? else {
                return Err(ProgressError::RecordNotFound {
                    viewer_id,
                    video_id,
                });
            };

            let mut record = versioned.record;
            record.clear();
            match self
                .store
                .store(record.clone(), Some(versioned.version))
                .await
            {
                Ok(_) => {
                    debug!(%viewer_id, %video_id, "reset watch record");
                    return Ok(record);
                }
                Err(ProgressError::WriteConflict { .. }) => continue,
                Err(err) => return Err(err),
            }
        }

        Err(ProgressError::WriteConflict {
            viewer_id,
            video_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{InMemoryVideoCatalog, InMemoryWatchRecordStore};
    use crate::store::ports::{MockVideoCatalog, VersionedRecord};
    use async_trait::async_trait;
    use rewind_model::Interval;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn iv(start: u64, end: u64) -> Interval {
        Interval { start, end }
    }

    fn update(intervals: Vec<Interval>, current_time: Option<u64>) -> UpdateProgressRequest {
        UpdateProgressRequest {
            intervals,
            current_time,
        }
    }

    async fn fixture(duration: u64) -> (ProgressReducer, ViewerID, VideoID) {
        let store = Arc::new(InMemoryWatchRecordStore::new());
        let catalog = Arc::new(InMemoryVideoCatalog::new());
        let video = Video::new("lecture", "file:///lecture.mp4", duration);
        let video_id = video.id;
        catalog.insert(video).await.unwrap();
        (
            ProgressReducer::new(store, catalog),
            ViewerID::new(),
            video_id,
        )
    }

    #[tokio::test]
    async fn get_or_create_returns_defaults_then_same_record() {
        let (reducer, viewer, video) = fixture(100).await;

        let first = reducer.get_or_create(viewer, video).await.unwrap();
        assert!(first.intervals.is_empty());
        assert_eq!(first.progress_percentage, 0.0);

        reducer
            .apply_update(viewer, video, update(vec![iv(0, 9)], None))
            .await
            .unwrap();
        let second = reducer.get_or_create(viewer, video).await.unwrap();
        assert_eq!(second.total_watched_seconds, 10);
    }

    #[tokio::test]
    async fn unknown_video_fails_every_operation() {
        let store = Arc::new(InMemoryWatchRecordStore::new());
        let mut catalog = MockVideoCatalog::new();
        catalog.expect_lookup().returning(|_| Ok(None));
        let reducer = ProgressReducer::new(store, Arc::new(catalog));
        let (viewer, video) = (ViewerID::new(), VideoID::new());

        for result in [
            reducer.get_or_create(viewer, video).await,
            reducer
                .apply_update(viewer, video, update(vec![iv(0, 1)], None))
                .await,
            reducer.reset(viewer, video).await,
        ] {
            assert!(matches!(result, Err(ProgressError::VideoNotFound(id)) if id == video));
        }
    }

    #[tokio::test]
    async fn merge_scenario_reaches_completion() {
        let (reducer, viewer, video) = fixture(100).await;

        let record = reducer
            .apply_update(viewer, video, update(vec![iv(0, 49)], Some(49)))
            .await
            .unwrap();
        assert_eq!(record.intervals, vec![iv(0, 49)]);
        assert_eq!(record.total_watched_seconds, 50);
        assert_eq!(record.progress_percentage, 50.0);
        assert!(!record.completed);
        assert_eq!(record.last_position, 49);

        let record = reducer
            .apply_update(viewer, video, update(vec![iv(50, 98)], Some(98)))
            .await
            .unwrap();
        assert_eq!(record.intervals, vec![iv(0, 98)]);
        assert_eq!(record.total_watched_seconds, 99);
        assert_eq!(record.progress_percentage, 99.0);
        assert!(record.completed);
    }

    #[tokio::test]
    async fn completion_boundary() {
        let (reducer, viewer, video) = fixture(100).await;

        let record = reducer
            .apply_update(viewer, video, update(vec![iv(0, 93)], None))
            .await
            .unwrap();
        assert_eq!(record.total_watched_seconds, 94);
        assert!(!record.completed);

        let record = reducer
            .apply_update(viewer, video, update(vec![iv(94, 94)], None))
            .await
            .unwrap();
        assert_eq!(record.total_watched_seconds, 95);
        assert!(record.completed);
    }

    #[tokio::test]
    async fn heartbeat_moves_position_only() {
        let (reducer, viewer, video) = fixture(100).await;

        reducer
            .apply_update(viewer, video, update(vec![iv(0, 9)], Some(9)))
            .await
            .unwrap();
        let record = reducer
            .apply_update(viewer, video, update(vec![], Some(42)))
            .await
            .unwrap();

        assert_eq!(record.last_position, 42);
        assert_eq!(record.intervals, vec![iv(0, 9)]);
        assert_eq!(record.total_watched_seconds, 10);
        assert_eq!(record.progress_percentage, 10.0);
    }

    #[tokio::test]
    async fn heartbeat_at_zero_is_a_real_position() {
        let (reducer, viewer, video) = fixture(100).await;

        reducer
            .apply_update(viewer, video, update(vec![], Some(42)))
            .await
            .unwrap();
        let record = reducer
            .apply_update(viewer, video, update(vec![], Some(0)))
            .await
            .unwrap();
        assert_eq!(record.last_position, 0);
    }

    #[tokio::test]
    async fn empty_update_is_a_noop_but_materializes_the_record() {
        let (reducer, viewer, video) = fixture(100).await;

        let record = reducer
            .apply_update(viewer, video, update(vec![], None))
            .await
            .unwrap();
        assert!(record.intervals.is_empty());
        assert_eq!(record.last_position, 0);

        // Record now exists, so reset succeeds.
        reducer.reset(viewer, video).await.unwrap();
    }

    #[tokio::test]
    async fn malformed_interval_leaves_record_untouched() {
        let (reducer, viewer, video) = fixture(100).await;

        reducer
            .apply_update(viewer, video, update(vec![iv(0, 9)], Some(9)))
            .await
            .unwrap();
        let err = reducer
            .apply_update(viewer, video, update(vec![iv(20, 10)], Some(20)))
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::InvalidInterval { .. }));

        let record = reducer.get_or_create(viewer, video).await.unwrap();
        assert_eq!(record.intervals, vec![iv(0, 9)]);
        assert_eq!(record.last_position, 9);
    }

    #[tokio::test]
    async fn full_range_interval_clamps_instead_of_panicking() {
        let (reducer, viewer, video) = fixture(100).await;

        let record = reducer
            .apply_update(viewer, video, update(vec![iv(0, u64::MAX)], None))
            .await
            .unwrap();
        assert_eq!(record.total_watched_seconds, u64::MAX);
        assert_eq!(record.progress_percentage, 100.0);
        assert!(record.completed);
    }

    #[tokio::test]
    async fn zero_duration_refuses_metric_update() {
        let (reducer, viewer, video) = fixture(0).await;

        let err = reducer
            .apply_update(viewer, video, update(vec![iv(0, 9)], None))
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::InvalidDuration(0)));
    }

    #[tokio::test]
    async fn reset_without_record_is_not_found() {
        let (reducer, viewer, video) = fixture(100).await;
        let err = reducer.reset(viewer, video).await.unwrap_err();
        assert!(matches!(err, ProgressError::RecordNotFound { .. }));
    }

    #[tokio::test]
    async fn reset_restores_creation_defaults() {
        let (reducer, viewer, video) = fixture(100).await;

        reducer
            .apply_update(viewer, video, update(vec![iv(0, 98)], Some(98)))
            .await
            .unwrap();
        let record = reducer.reset(viewer, video).await.unwrap();

        assert!(record.intervals.is_empty());
        assert_eq!(record.total_watched_seconds, 0);
        assert_eq!(record.progress_percentage, 0.0);
        assert!(!record.completed);
        assert_eq!(record.last_position, 0);
    }

    #[tokio::test]
    async fn listing_joins_catalog_metadata() {
        let store = Arc::new(InMemoryWatchRecordStore::new());
        let catalog = Arc::new(InMemoryVideoCatalog::new());
        let mut video = Video::new("intro", "file:///intro.mp4", 120);
        video.thumbnail = Some("intro.jpg".to_string());
        let video_id = video.id;
        catalog.insert(video).await.unwrap();

        let reducer = ProgressReducer::new(store, catalog);
        let viewer = ViewerID::new();
        reducer
            .apply_update(viewer, video_id, update(vec![iv(0, 59)], Some(59)))
            .await
            .unwrap();

        let entries = reducer.list_for_viewer(viewer).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "intro");
        assert_eq!(entries[0].thumbnail.as_deref(), Some("intro.jpg"));
        assert_eq!(entries[0].duration_seconds, 120);
        assert_eq!(entries[0].record.total_watched_seconds, 60);
    }

    #[tokio::test]
    async fn concurrent_disjoint_updates_both_survive() {
        let (reducer, viewer, video) = fixture(100).await;
        let reducer = Arc::new(reducer);

        let a = {
            let reducer = Arc::clone(&reducer);
            tokio::spawn(async move {
                reducer
                    .apply_update(viewer, video, update(vec![iv(0, 19)], None))
                    .await
            })
        };
        let b = {
            let reducer = Arc::clone(&reducer);
            tokio::spawn(async move {
                reducer
                    .apply_update(viewer, video, update(vec![iv(40, 59)], None))
                    .await
            })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let record = reducer.get_or_create(viewer, video).await.unwrap();
        assert_eq!(record.intervals, vec![iv(0, 19), iv(40, 59)]);
        assert_eq!(record.total_watched_seconds, 40);
    }

    /// Store wrapper that fails the first N compare-and-swap writes.
    struct ConflictingStore {
        inner: InMemoryWatchRecordStore,
        conflicts_left: AtomicU32,
    }

    #[async_trait]
    impl WatchRecordStore for ConflictingStore {
        async fn load(
            &self,
            viewer_id: ViewerID,
            video_id: VideoID,
        ) -> Result<Option<VersionedRecord>> {
            self.inner.load(viewer_id, video_id).await
        }

        async fn store(
            &self,
            record: WatchRecord,
            expected_version: Option<u64>,
        ) -> Result<u64> {
            if self.conflicts_left.load(Ordering::SeqCst) > 0 {
                self.conflicts_left.fetch_sub(1, Ordering::SeqCst);
                return Err(ProgressError::WriteConflict {
                    viewer_id: record.viewer_id,
                    video_id: record.video_id,
                });
            }
            self.inner.store(record, expected_version).await
        }

        async fn list_for_viewer(&self, viewer_id: ViewerID) -> Result<Vec<WatchRecord>> {
            self.inner.list_for_viewer(viewer_id).await
        }
    }

    async fn conflicting_fixture(
        conflicts: u32,
    ) -> (ProgressReducer, ViewerID, VideoID) {
        let store = Arc::new(ConflictingStore {
            inner: InMemoryWatchRecordStore::new(),
            conflicts_left: AtomicU32::new(conflicts),
        });
        let catalog = Arc::new(InMemoryVideoCatalog::new());
        let video = Video::new("lecture", "file:///lecture.mp4", 100);
        let video_id = video.id;
        catalog.insert(video).await.unwrap();
        (
            ProgressReducer::new(store, catalog),
            ViewerID::new(),
            video_id,
        )
    }

    #[tokio::test]
    async fn transient_conflicts_are_retried_internally() {
        let (reducer, viewer, video) = conflicting_fixture(2).await;
        let record = reducer
            .apply_update(viewer, video, update(vec![iv(0, 9)], None))
            .await
            .unwrap();
        assert_eq!(record.total_watched_seconds, 10);
    }

    #[tokio::test]
    async fn persistent_conflicts_surface_after_the_retry_bound() {
        let (reducer, viewer, video) = conflicting_fixture(u32::MAX).await;
        let err = reducer
            .apply_update(viewer, video, update(vec![iv(0, 9)], None))
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::WriteConflict { .. }));
    }
}

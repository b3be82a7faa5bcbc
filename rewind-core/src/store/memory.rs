//! In-memory store and catalog backed by DashMap.
//!
//! The store's compare-and-swap relies on DashMap's entry API holding the
//! shard lock for the duration of the check-and-write, so two writers racing
//! on one key cannot both observe the same version and both succeed.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rewind_model::{Video, VideoID, ViewerID, WatchRecord};

use crate::error::{ProgressError, Result};
use crate::store::ports::{VersionedRecord, VideoCatalog, WatchRecordStore};

/// Volatile [`WatchRecordStore`] for tests, demos, and single-node setups.
#[derive(Debug, Default)]
pub struct InMemoryWatchRecordStore {
    records: DashMap<(ViewerID, VideoID), VersionedRecord>,
}

impl InMemoryWatchRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WatchRecordStore for InMemoryWatchRecordStore {
    async fn load(
        &self,
        viewer_id: ViewerID,
        video_id: VideoID,
    ) -> Result<Option<VersionedRecord>> {
        Ok(self
            .records
            .get(&(viewer_id, video_id))
            .map(|entry| entry.value().clone()))
    }

    async fn store(&self, record: WatchRecord, expected_version: Option<u64>) -> Result<u64> {
        let key = (record.viewer_id, record.video_id);
        let conflict = || ProgressError::WriteConflict {
            viewer_id: key.0,
            video_id: key.1,
        };

        match (self.records.entry(key), expected_version) {
            (Entry::Vacant(slot), None) => {
                slot.insert(VersionedRecord { record, version: 1 });
                Ok(1)
            }
            (Entry::Occupied(mut slot), Some(expected)) => {
                if slot.get().version != expected {
                    return Err(conflict());
                }
                let version = expected + 1;
                slot.insert(VersionedRecord { record, version });
                Ok(version)
            }
            // Created behind our back, or deleted while we held a version.
            (Entry::Vacant(_), Some(_)) | (Entry::Occupied(_), None) => Err(conflict()),
        }
    }

    async fn list_for_viewer(&self, viewer_id: ViewerID) -> Result<Vec<WatchRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.key().0 == viewer_id)
            .map(|entry| entry.value().record.clone())
            .collect())
    }
}

/// Volatile [`VideoCatalog`] for tests, demos, and single-node setups.
#[derive(Debug, Default)]
pub struct InMemoryVideoCatalog {
    videos: DashMap<VideoID, Video>,
}

impl InMemoryVideoCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoCatalog for InMemoryVideoCatalog {
    async fn lookup(&self, video_id: VideoID) -> Result<Option<Video>> {
        Ok(self.videos.get(&video_id).map(|entry| entry.value().clone()))
    }

    async fn list_published(&self) -> Result<Vec<Video>> {
        Ok(self
            .videos
            .iter()
            .filter(|entry| entry.value().is_published)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn insert(&self, video: Video) -> Result<()> {
        self.videos.insert(video.id, video);
        Ok(())
    }
}

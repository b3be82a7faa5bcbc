use async_trait::async_trait;
use rewind_model::{Video, VideoID, ViewerID, WatchRecord};

use crate::error::Result;

/// A stored record together with the version the store assigned to it.
///
/// Versions exist purely for optimistic concurrency: `store` only replaces a
/// record when the caller proves it saw the latest version.
#[derive(Debug, Clone)]
pub struct VersionedRecord {
    pub record: WatchRecord,
    pub version: u64,
}

/// Keyed record store for watch progress, one record per (viewer, video).
///
/// Writes are compare-and-swap: `expected_version: None` means "create,
/// failing if a record already exists", `Some(v)` means "replace, failing if
/// the stored version is no longer `v`". Both failure modes surface as
/// [`crate::ProgressError::WriteConflict`], which the reducer resolves by
/// reloading and retrying.
#[async_trait]
pub trait WatchRecordStore: Send + Sync {
    async fn load(
        &self,
        viewer_id: ViewerID,
        video_id: VideoID,
    ) -> Result<Option<VersionedRecord>>;

    /// Persist `record`, returning the new version on success.
    async fn store(&self, record: WatchRecord, expected_version: Option<u64>) -> Result<u64>;

    /// All records belonging to one viewer, in unspecified order.
    async fn list_for_viewer(&self, viewer_id: ViewerID) -> Result<Vec<WatchRecord>>;
}

/// Read access to the external video catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Look up a video by id; `None` when the catalog does not know it.
    async fn lookup(&self, video_id: VideoID) -> Result<Option<Video>>;

    /// All published videos.
    async fn list_published(&self) -> Result<Vec<Video>>;

    /// Register a video with the catalog.
    async fn insert(&self, video: Video) -> Result<()>;
}

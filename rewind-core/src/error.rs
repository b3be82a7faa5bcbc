use rewind_model::{ModelError, ViewerID, VideoID};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("invalid interval: end {end} precedes start {start}")]
    InvalidInterval { start: u64, end: u64 },

    #[error("invalid video duration: {0} seconds")]
    InvalidDuration(u64),

    #[error("video not found: {0}")]
    VideoNotFound(VideoID),

    #[error("no progress record for viewer {viewer_id} and video {video_id}")]
    RecordNotFound {
        viewer_id: ViewerID,
        video_id: VideoID,
    },

    #[error("write conflict on watch record for viewer {viewer_id} and video {video_id}")]
    WriteConflict {
        viewer_id: ViewerID,
        video_id: VideoID,
    },

    #[error("store error: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ModelError> for ProgressError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidInterval { start, end } => {
                ProgressError::InvalidInterval { start, end }
            }
            other => ProgressError::Internal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProgressError>;

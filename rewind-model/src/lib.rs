//! Core data model definitions shared across Rewind crates.
#![allow(missing_docs)]

pub mod api;
pub mod error;
pub mod ids;
pub mod interval;
pub mod record;
pub mod video;

// Intentionally curated re-exports for downstream consumers.
pub use api::{ApiResponse, UpdateProgressRequest, ViewerProgressEntry};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ViewerID, VideoID};
pub use interval::Interval;
pub use record::WatchRecord;
pub use video::Video;

use crate::ids::VideoID;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog entry for a playable video.
///
/// The progress engine only depends on `duration_seconds`; the remaining
/// fields exist so listings can render without a second catalog round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: VideoID,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    /// Total runtime in whole seconds
    pub duration_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default = "default_published")]
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

fn default_published() -> bool {
    true
}

impl Video {
    pub fn new(title: impl Into<String>, url: impl Into<String>, duration_seconds: u64) -> Self {
        Video {
            id: VideoID::new(),
            title: title.into(),
            description: None,
            url: url.into(),
            duration_seconds,
            thumbnail: None,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}

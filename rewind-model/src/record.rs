use crate::ids::{ViewerID, VideoID};
use crate::interval::Interval;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted watch-progress state for one (viewer, video) pair.
///
/// At most one record exists per pair. `intervals` always holds the canonical
/// form: sorted by start, pairwise disjoint, adjacent runs merged. The metric
/// fields are derived from `intervals` on every mutation and are never
/// patched independently.
///
/// # Example
///
/// ```json
/// {
///   "viewer_id": "01890a5d-ac96-774b-b9aa-a7b56e21a35e",
///   "video_id": "01890a5d-ac96-774b-b9aa-a7b56e21a360",
///   "intervals": [{ "start": 0, "end": 98 }],
///   "total_watched_seconds": 99,
///   "progress_percentage": 99.0,
///   "completed": true,
///   "last_position": 98
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchRecord {
    pub viewer_id: ViewerID,
    pub video_id: VideoID,
    /// Canonical watched intervals: sorted, disjoint, adjacency-merged
    pub intervals: Vec<Interval>,
    /// Distinct seconds covered by `intervals`
    pub total_watched_seconds: u64,
    /// Watched share of the video runtime, clamped to `[0, 100]`
    pub progress_percentage: f64,
    /// True once `progress_percentage` reaches the completion threshold
    pub completed: bool,
    /// Last reported playhead position, used for resume
    pub last_position: u64,
    /// Timestamp of the last mutation
    pub last_watched: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl WatchRecord {
    /// Fresh record with creation defaults: no intervals, zero metrics.
    pub fn new(viewer_id: ViewerID, video_id: VideoID) -> Self {
        let now = Utc::now();
        WatchRecord {
            viewer_id,
            video_id,
            intervals: Vec::new(),
            total_watched_seconds: 0,
            progress_percentage: 0.0,
            completed: false,
            last_position: 0,
            last_watched: now,
            created_at: now,
        }
    }

    /// Restore every mutable field to its creation default.
    pub fn clear(&mut self) {
        self.intervals.clear();
        self.total_watched_seconds = 0;
        self.progress_percentage = 0.0;
        self.completed = false;
        self.last_position = 0;
        self.last_watched = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_defaults() {
        let record = WatchRecord::new(ViewerID::new(), VideoID::new());
        assert!(record.intervals.is_empty());
        assert_eq!(record.total_watched_seconds, 0);
        assert_eq!(record.progress_percentage, 0.0);
        assert!(!record.completed);
        assert_eq!(record.last_position, 0);
    }

    #[test]
    fn clear_restores_defaults() {
        let mut record = WatchRecord::new(ViewerID::new(), VideoID::new());
        record.intervals.push(Interval { start: 0, end: 10 });
        record.total_watched_seconds = 11;
        record.progress_percentage = 11.0;
        record.completed = true;
        record.last_position = 10;

        record.clear();

        assert!(record.intervals.is_empty());
        assert_eq!(record.total_watched_seconds, 0);
        assert_eq!(record.progress_percentage, 0.0);
        assert!(!record.completed);
        assert_eq!(record.last_position, 0);
    }
}

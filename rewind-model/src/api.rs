use crate::interval::Interval;
use crate::record::WatchRecord;
use serde::{Deserialize, Serialize};

/// Progress update payload
///
/// Sent by clients while playback proceeds. Carries either a batch of newly
/// observed intervals, a bare playhead position, or both.
///
/// `current_time` distinguishes "absent" from zero: `Some(0)` is a real
/// position at the start of the video and must update the resume point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProgressRequest {
    /// Newly observed watched intervals, not necessarily sorted or disjoint
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intervals: Vec<Interval>,
    /// Current playhead position in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<u64>,
}

impl UpdateProgressRequest {
    /// A position-only heartbeat with no interval payload.
    pub fn heartbeat(position: u64) -> Self {
        UpdateProgressRequest {
            intervals: Vec::new(),
            current_time: Some(position),
        }
    }

    /// Whether this update would leave a record untouched.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty() && self.current_time.is_none()
    }
}

/// One entry of a viewer-wide progress listing, joined with catalog metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerProgressEntry {
    #[serde(flatten)]
    pub record: WatchRecord,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub duration_seconds: u64,
}

/// Success envelope wrapping every REST payload.
///
/// Failures never use this shape; they carry the error object emitted by the
/// server's error type, keyed by HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_keeps_zero_position() {
        let update = UpdateProgressRequest::heartbeat(0);
        assert_eq!(update.current_time, Some(0));
        assert!(!update.is_empty());
    }

    #[test]
    fn absent_current_time_deserializes_to_none() {
        let update: UpdateProgressRequest =
            serde_json::from_str(r#"{"intervals":[{"start":0,"end":5}]}"#).unwrap();
        assert_eq!(update.current_time, None);
        assert_eq!(update.intervals.len(), 1);
    }

    #[test]
    fn empty_body_is_a_noop_update() {
        let update: UpdateProgressRequest = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn success_envelope_wire_shape() {
        let json = serde_json::to_value(ApiResponse::success(7)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "data": 7}));
    }
}

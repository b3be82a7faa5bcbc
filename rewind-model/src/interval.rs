use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// An inclusive `[start, end]` range of video seconds reported as watched.
///
/// Both bounds are video-relative whole seconds. A one-second observation is
/// represented as `start == end`, so the covered length is always
/// `end - start + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: u64,
    pub end: u64,
}

impl Interval {
    /// Build a validated interval. Fails when `end` precedes `start`.
    pub fn new(start: u64, end: u64) -> Result<Self, ModelError> {
        if end < start {
            return Err(ModelError::InvalidInterval { start, end });
        }
        Ok(Interval { start, end })
    }

    /// A single observed second at `position`.
    pub fn at(position: u64) -> Self {
        Interval {
            start: position,
            end: position,
        }
    }

    /// Inclusive length in seconds.
    ///
    /// Saturates for the degenerate `[0, u64::MAX]` interval, whose true
    /// length does not fit in a `u64`.
    pub fn seconds(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// Whether `time` falls inside this interval.
    pub fn contains(&self, time: u64) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn is_valid(&self) -> bool {
        self.end >= self.start
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_bounds() {
        assert!(Interval::new(10, 9).is_err());
        assert!(Interval::new(10, 10).is_ok());
    }

    #[test]
    fn inclusive_length() {
        assert_eq!(Interval::at(7).seconds(), 1);
        assert_eq!(Interval::new(0, 49).unwrap().seconds(), 50);
    }

    #[test]
    fn full_range_length_saturates_instead_of_overflowing() {
        assert_eq!(Interval::new(0, u64::MAX).unwrap().seconds(), u64::MAX);
        assert_eq!(Interval::new(1, u64::MAX).unwrap().seconds(), u64::MAX);
    }

    #[test]
    fn wire_shape_is_start_end() {
        let json = serde_json::to_value(Interval { start: 3, end: 8 }).unwrap();
        assert_eq!(json, serde_json::json!({"start": 3, "end": 8}));
    }
}

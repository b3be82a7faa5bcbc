//! Interval normalization and aggregate metrics
//!
//! Everything downstream (the reducer, the tracker's provisional percentage,
//! the unwatched-segment query) funnels through [`merge`], so the canonical
//! form is established in exactly one place: sorted by start, pairwise
//! disjoint, adjacent runs collapsed.

use crate::error::{ProgressError, Result};
use rewind_model::Interval;

/// Percentage of the runtime that must be covered before a video counts as
/// completed.
pub const COMPLETION_THRESHOLD: f64 = 95.0;

/// Merge an arbitrary multiset of intervals into canonical form.
///
/// Sorts by `start` and folds left, extending the trailing interval whenever
/// the next one overlaps or directly abuts it (`cur.start <= last.end + 1`,
/// the `+1` reflecting inclusive-second semantics: `[0,5]` and `[6,9]` have
/// no gap between them). The result covers exactly the same seconds as the
/// input, and re-merging an already canonical set is a no-op.
///
/// Malformed intervals (`end < start`) are rejected up front so a bad batch
/// can never corrupt an existing record.
pub fn merge(intervals: &[Interval]) -> Result<Vec<Interval>> {
    for interval in intervals {
        if !interval.is_valid() {
            return Err(ProgressError::InvalidInterval {
                start: interval.start,
                end: interval.end,
            });
        }
    }

    let mut sorted = intervals.to_vec();
    // Ties on equal starts are irrelevant: the fold only looks at max(end).
    sorted.sort_by_key(|interval| interval.start);

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for current in sorted {
        match merged.last_mut() {
            Some(last) if current.start <= last.end.saturating_add(1) => {
                last.end = last.end.max(current.end);
            }
            _ => merged.push(current),
        }
    }

    Ok(merged)
}

/// Count of distinct seconds covered by a canonical interval set.
///
/// Saturates at `u64::MAX`: coverage of the entire `u64` second domain is
/// one past what the type can hold, and nothing downstream distinguishes the
/// two (the percentage is clamped anyway).
pub fn total_watched_seconds(intervals: &[Interval]) -> u64 {
    intervals
        .iter()
        .map(Interval::seconds)
        .fold(0, u64::saturating_add)
}

/// Watched share of the runtime as a percentage, clamped to `[0, 100]`.
///
/// A zero duration is refused rather than letting the division poison the
/// metrics with NaN or infinity.
pub fn progress_percentage(total_watched: u64, duration_seconds: u64) -> Result<f64> {
    if duration_seconds == 0 {
        return Err(ProgressError::InvalidDuration(duration_seconds));
    }
    let raw = total_watched as f64 / duration_seconds as f64 * 100.0;
    Ok(raw.clamp(0.0, 100.0))
}

/// Whether a percentage crosses the completion threshold.
pub fn is_completed(percentage: f64) -> bool {
    percentage >= COMPLETION_THRESHOLD
}

/// True iff some interval contains `time`.
pub fn is_time_watched(intervals: &[Interval], time: u64) -> bool {
    intervals.iter().any(|interval| interval.contains(time))
}

/// The complement of the watched intervals within `[0, duration - 1]`.
///
/// Accepts any interval multiset (it normalizes internally) and returns the
/// leading gap, the gaps between watched runs, and the trailing gap through
/// the final second, in order. Intervals past the end of the video simply
/// contribute no gap.
pub fn unwatched_segments(intervals: &[Interval], duration_seconds: u64) -> Result<Vec<Interval>> {
    if duration_seconds == 0 {
        return Err(ProgressError::InvalidDuration(duration_seconds));
    }
    let last_second = duration_seconds - 1;
    let merged = merge(intervals)?;

    let mut gaps = Vec::new();
    let mut cursor = 0u64;
    for interval in &merged {
        if interval.start > cursor && cursor <= last_second {
            gaps.push(Interval {
                start: cursor,
                end: (interval.start - 1).min(last_second),
            });
        }
        cursor = cursor.max(interval.end.saturating_add(1));
    }
    if cursor <= last_second {
        gaps.push(Interval {
            start: cursor,
            end: last_second,
        });
    }

    Ok(gaps)
}

//! Save scheduling policy
//!
//! Ticks arrive once a second, but the server only needs to hear from a
//! session every few seconds: saves are rate-limited to one per `min_gap` and
//! coalesced with a short debounce window so a burst of requests collapses
//! into a single call carrying the latest snapshot. Runs entirely on the
//! tokio clock, so tests drive it with a paused runtime.

use std::time::Duration;
use tokio::time::Instant;

use crate::session::SaveRequest;

#[derive(Debug, Clone)]
pub struct SavePolicy {
    /// Minimum spacing between two saves
    pub min_gap: Duration,
    /// Quiet period a debounced request waits for further requests
    pub debounce: Duration,
}

impl Default for SavePolicy {
    fn default() -> Self {
        Self {
            min_gap: Duration::from_secs(5),
            debounce: Duration::from_secs(1),
        }
    }
}

/// Decides when a requested save should actually fire.
#[derive(Debug)]
pub struct SaveScheduler {
    policy: SavePolicy,
    last_fired: Option<Instant>,
    deadline: Option<Instant>,
    /// Work arrived since the last fire, deadline or not
    dirty: bool,
}

impl SaveScheduler {
    pub fn new(policy: SavePolicy) -> Self {
        Self {
            policy,
            last_fired: None,
            deadline: None,
            dirty: false,
        }
    }

    /// Register a save request.
    ///
    /// Debounced requests inside the rate-limit window are dropped outright;
    /// later ticks re-cover the same ground. Otherwise the pending deadline
    /// resets to `now + debounce`. Immediate requests fire as soon as the
    /// caller polls, ignoring the rate limit.
    pub fn request(&mut self, request: SaveRequest) {
        let now = Instant::now();
        match request {
            SaveRequest::None => {}
            SaveRequest::Debounced => {
                self.dirty = true;
                if let Some(last) = self.last_fired {
                    if now < last + self.policy.min_gap {
                        return;
                    }
                }
                self.deadline = Some(now + self.policy.debounce);
            }
            SaveRequest::Immediate => {
                self.dirty = true;
                self.deadline = Some(now);
            }
        }
    }

    /// When the pending save is due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether anything changed since the last fire, counting requests the
    /// rate limit dropped. Teardown flushes on this, not on [`Self::is_pending`],
    /// so coverage reported inside the rate-limit window is never lost.
    pub fn needs_flush(&self) -> bool {
        self.deadline.is_some() || self.dirty
    }

    /// Record that the pending save was carried out.
    pub fn mark_fired(&mut self) {
        self.last_fired = Some(Instant::now());
        self.deadline = None;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn scheduler() -> SaveScheduler {
        SaveScheduler::new(SavePolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_pending_initially() {
        let mut s = scheduler();
        assert!(!s.is_pending());
        s.request(SaveRequest::None);
        assert!(!s.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_requests_coalesce_onto_the_latest_deadline() {
        let mut s = scheduler();
        s.request(SaveRequest::Debounced);
        let first = s.deadline().unwrap();

        advance(Duration::from_millis(500)).await;
        s.request(SaveRequest::Debounced);
        let second = s.deadline().unwrap();

        assert_eq!(second, first + Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_drops_requests_after_a_fire() {
        let mut s = scheduler();
        s.request(SaveRequest::Debounced);
        advance(Duration::from_secs(1)).await;
        s.mark_fired();

        // Inside the 5s window: dropped without a deadline.
        advance(Duration::from_secs(2)).await;
        s.request(SaveRequest::Debounced);
        assert!(!s.is_pending());

        // Past the window: accepted again.
        advance(Duration::from_secs(4)).await;
        s.request(SaveRequest::Debounced);
        assert!(s.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_requests_still_need_a_flush() {
        let mut s = scheduler();
        s.request(SaveRequest::Debounced);
        advance(Duration::from_secs(1)).await;
        s.mark_fired();
        assert!(!s.needs_flush());

        // Rate limit swallows the deadline but not the unsaved work.
        advance(Duration::from_secs(2)).await;
        s.request(SaveRequest::Debounced);
        assert!(!s.is_pending());
        assert!(s.needs_flush());

        s.mark_fired();
        assert!(!s.needs_flush());
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_requests_ignore_the_rate_limit() {
        let mut s = scheduler();
        s.request(SaveRequest::Debounced);
        advance(Duration::from_secs(1)).await;
        s.mark_fired();

        s.request(SaveRequest::Immediate);
        assert_eq!(s.deadline(), Some(Instant::now()));
    }
}

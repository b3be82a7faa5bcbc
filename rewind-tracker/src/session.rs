//! Playback session state machine
//!
//! Tracks one playback view as a sequence of player events. While playing, an
//! "open" interval follows the playhead; pauses, endings, and large seeks
//! close it into the set of finished intervals. The session keeps its local
//! interval set canonical (same merge as the server) so the provisional
//! percentage shown during playback matches what the server will derive.

use rewind_core::{Result, intervals};
use rewind_model::Interval;
use tracing::trace;

/// Seeks within this many seconds of the last observed position are treated
/// as continuous playback rather than a discontinuity.
pub const SEEK_TOLERANCE_SECONDS: u64 = 3;

/// Lifecycle of a playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Playing,
    Paused,
    Ended,
}

/// Player-side events fed into the session, in playback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Playback started or resumed at this position
    Play { position: u64 },
    /// Periodic playhead observation while playing (roughly once per second)
    Tick { position: u64 },
    /// The playhead jumped to this position
    Seek { position: u64 },
    Pause,
    Ended,
}

/// What the caller should do about persistence after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRequest {
    /// Nothing changed that is worth saving
    None,
    /// Coalesce with upcoming requests (periodic tick traffic)
    Debounced,
    /// Flush as soon as possible (pause, ended)
    Immediate,
}

/// Local progress snapshot carried by a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Canonical union of finished intervals and the open one
    pub intervals: Vec<Interval>,
    /// Last observed playhead position
    pub position: u64,
}

/// State for a single (viewer, video) playback session.
#[derive(Debug)]
pub struct WatchSession {
    state: SessionState,
    /// Intervals already closed out by pauses, endings, or large seeks
    finished: Vec<Interval>,
    /// Grows with the playhead; exists only while `Playing`
    open: Option<Interval>,
    /// Last position observed from any event
    cursor: u64,
    duration_seconds: u64,
    /// Provisional percentage over finished + open intervals
    percentage: f64,
}

impl WatchSession {
    pub fn new(duration_seconds: u64) -> Result<Self> {
        // Refuse a zero duration up front rather than report NaN percentages
        // for the whole session.
        intervals::progress_percentage(0, duration_seconds)?;
        Ok(Self {
            state: SessionState::Idle,
            finished: Vec::new(),
            open: None,
            cursor: 0,
            duration_seconds,
            percentage: 0.0,
        })
    }

    /// Resume a session from previously persisted intervals.
    pub fn with_history(duration_seconds: u64, history: &[Interval]) -> Result<Self> {
        let mut session = Self::new(duration_seconds)?;
        session.finished = intervals::merge(history)?;
        session.percentage = intervals::progress_percentage(
            intervals::total_watched_seconds(&session.finished),
            duration_seconds,
        )?;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Provisional watched percentage, including the open interval.
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// Apply one player event, returning how urgently the resulting state
    /// should be persisted.
    pub fn apply(&mut self, event: PlayerEvent) -> SaveRequest {
        match event {
            PlayerEvent::Play { position } => self.on_play(position),
            PlayerEvent::Tick { position } => self.on_tick(position),
            PlayerEvent::Seek { position } => self.on_seek(position),
            PlayerEvent::Pause => self.on_stop(SessionState::Paused),
            PlayerEvent::Ended => self.on_stop(SessionState::Ended),
        }
    }

    fn on_play(&mut self, position: u64) -> SaveRequest {
        self.state = SessionState::Playing;
        if self.open.is_none() {
            trace!(position, "opening interval");
            self.open = Some(Interval::at(position));
        }
        self.cursor = position;
        SaveRequest::None
    }

    fn on_tick(&mut self, position: u64) -> SaveRequest {
        if self.state != SessionState::Playing {
            return SaveRequest::None;
        }
        match self.open.as_mut() {
            Some(open) if position >= open.start => {
                open.end = open.end.max(position);
            }
            // The playhead moved behind the open interval without a seek
            // event (some players report small rewinds this way). Close what
            // we have and restart at the observed position.
            Some(_) => self.restart_open_at(position),
            None => self.open = Some(Interval::at(position)),
        }
        self.cursor = position;
        self.recompute_percentage();
        SaveRequest::Debounced
    }

    fn on_seek(&mut self, position: u64) -> SaveRequest {
        if self.state == SessionState::Playing {
            let distance = position.abs_diff(self.cursor);
            if distance > SEEK_TOLERANCE_SECONDS {
                trace!(from = self.cursor, to = position, "seek discontinuity");
                self.restart_open_at(position);
                self.recompute_percentage();
            }
            // Small seeks are continuous playback: only the cursor moves.
        }
        self.cursor = position;
        SaveRequest::None
    }

    fn on_stop(&mut self, state: SessionState) -> SaveRequest {
        self.state = state;
        if let Some(open) = self.open.take() {
            self.finished.push(open);
            self.finished = intervals::merge(&self.finished).unwrap_or_default();
            self.recompute_percentage();
        }
        SaveRequest::Immediate
    }

    /// Close the open interval into the finished set and reopen at `position`.
    fn restart_open_at(&mut self, position: u64) {
        if let Some(open) = self.open.take() {
            self.finished.push(open);
            self.finished = intervals::merge(&self.finished).unwrap_or_default();
        }
        self.open = Some(Interval::at(position));
    }

    fn recompute_percentage(&mut self) {
        let snapshot = self.snapshot();
        if let Ok(pct) = intervals::progress_percentage(
            intervals::total_watched_seconds(&snapshot.intervals),
            self.duration_seconds,
        ) {
            self.percentage = pct;
        }
    }

    /// Canonical view of everything watched so far, open interval included.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let mut all = self.finished.clone();
        if let Some(open) = self.open {
            all.push(open);
        }
        // Finished and open intervals are valid by construction.
        let intervals = intervals::merge(&all).unwrap_or_default();
        ProgressSnapshot {
            intervals,
            position: self.cursor,
        }
    }
}

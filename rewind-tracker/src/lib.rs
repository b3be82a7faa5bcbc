//! Client-side playback session tracking
//!
//! This crate is the producing half of the progress pipeline: it watches a
//! single playback session, accumulates watched intervals locally, and ships
//! them to the server on a debounced schedule. Playback never waits on a
//! save; failed saves are logged and re-covered by later ones.
//!
//! Structure mirrors the engine it feeds:
//!
//! - [`session`]: the pure playback state machine (open interval, ticks,
//!   seek discontinuities)
//! - [`scheduler`]: the save rate-limit/debounce policy on the tokio clock
//! - [`transport`]: how snapshots reach the server
//! - [`driver`]: the event-queue task tying the three together
#![allow(missing_docs)]

pub mod driver;
pub mod scheduler;
pub mod session;
pub mod transport;

pub use driver::{SessionDriver, SessionHandle};
pub use scheduler::{SavePolicy, SaveScheduler};
pub use session::{PlayerEvent, ProgressSnapshot, SaveRequest, SessionState, WatchSession};
pub use transport::{HttpTransport, ProgressTransport};

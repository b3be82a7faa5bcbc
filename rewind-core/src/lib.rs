//! Watch-progress engine for Rewind
//!
//! This crate owns the canonical per-(viewer, video) watched-interval state:
//! merging raw observation intervals into a sorted, disjoint set, deriving
//! watched time and completion from it, and reconciling concurrent updates
//! against an abstract record store.
//!
//! ## Key Concepts
//!
//! - **Canonical interval set**: sorted by start, pairwise disjoint, with
//!   adjacent runs merged (`[0,5]` + `[6,9]` collapses to `[0,9]`)
//! - **Completed**: a video counts as completed once at least 95% of its
//!   runtime is covered by watched intervals
//! - **Reconciliation**: updates are applied with compare-and-swap retries so
//!   concurrent reports from the same viewer never silently drop coverage
#![allow(missing_docs)]

pub mod error;
pub mod intervals;
pub mod reducer;
pub mod store;

pub use error::{ProgressError, Result};
pub use reducer::ProgressReducer;
pub use store::memory::{InMemoryVideoCatalog, InMemoryWatchRecordStore};
pub use store::ports::{VersionedRecord, VideoCatalog, WatchRecordStore};

//! # Rewind Server
//!
//! REST API for viewer watch progress.
//!
//! ## Overview
//!
//! The server exposes the progress engine over HTTP:
//!
//! - **Watch Progress**: per-(viewer, video) interval tracking with resume
//!   positions and completion state
//! - **Catalog**: a minimal video registry backing the progress endpoints
//!
//! All semantics live in `rewind-core`; handlers only translate between HTTP
//! and the [`rewind_core::ProgressReducer`].

pub mod config;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::Config;
pub use errors::{AppError, AppResult};
pub use state::AppState;

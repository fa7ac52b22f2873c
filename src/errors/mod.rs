//! Centralized error handling for the channel curation engine.
//!
//! Mirrors the layering used throughout the rest of the engine: a top-level
//! [`AppError`] that fatal paths return, plus narrower error types for the
//! layers that need to distinguish retryable/non-fatal conditions from
//! aborting ones.

pub mod types;

pub use types::*;

/// Convenience alias for top-level application results.
pub type AppResult<T> = Result<T, AppError>;

//! Error types for the environment abstraction.
//!
//! Every collaborator failure here is non-fatal by contract: the consumer
//! degrades to nominal constants or the uncorrected local clock.

use thiserror::Error;

/// Errors raised by environment collaborators.
#[derive(Debug, Clone, Error)]
pub enum EnvError {
    /// The ephemeris engine is unavailable; callers fall back to nominal
    /// constants.
    #[error("ephemeris unavailable: {0}")]
    EphemerisUnavailable(String),

    /// Network time synchronization failed; the clock keeps its last known
    /// offset (possibly zero).
    #[error("time sync unavailable: {0}")]
    TimeSyncUnavailable(String),

    /// Context operation failed.
    #[error("context error: {0}")]
    ContextError(String),
}

impl EnvError {
    /// Creates an ephemeris-unavailable error.
    pub fn ephemeris(msg: impl Into<String>) -> Self {
        Self::EphemerisUnavailable(msg.into())
    }

    /// Creates a time-sync-unavailable error.
    pub fn time_sync(msg: impl Into<String>) -> Self {
        Self::TimeSyncUnavailable(msg.into())
    }
}

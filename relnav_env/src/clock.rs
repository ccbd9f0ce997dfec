//! Corrected wall clock: local time plus a network-derived offset.
//!
//! The offset comes from an external time-sync collaborator. If the sync
//! fails, the clock keeps its last known offset (possibly zero) and keeps
//! ticking; time synchronization is never fatal.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use crate::context::NavContext;
use crate::error::EnvError;

/// Wall clock combining the context's system time with a sync offset.
pub struct CorrectedClock<C: NavContext> {
    ctx: Arc<C>,
    offset_ms: AtomicI64,
}

impl<C: NavContext> CorrectedClock<C> {
    /// Creates a clock with a zero offset.
    pub fn new(ctx: Arc<C>) -> Self {
        Self {
            ctx,
            offset_ms: AtomicI64::new(0),
        }
    }

    /// Current corrected wall-clock time in milliseconds since the epoch.
    pub fn corrected_now_ms(&self) -> f64 {
        let local_ms = self
            .ctx
            .system_time()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        (local_ms + self.offset_ms.load(Ordering::Relaxed)) as f64
    }

    /// The currently applied offset in milliseconds.
    pub fn offset_ms(&self) -> i64 {
        self.offset_ms.load(Ordering::Relaxed)
    }

    /// Applies the result of a sync attempt.
    ///
    /// A failed attempt leaves the previous offset in place and returns the
    /// error for status reporting only.
    pub fn apply_sync(&self, result: Result<i64, EnvError>) -> Result<(), EnvError> {
        match result {
            Ok(offset) => {
                self.offset_ms.store(offset, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => Err(EnvError::time_sync(e.to_string())),
        }
    }
}

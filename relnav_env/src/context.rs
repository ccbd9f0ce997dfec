//! Core environment context trait for the navigation runtime.

use async_trait::async_trait;
use std::time::{Duration, SystemTime};

/// The central interface for environment interaction.
///
/// Abstracts the host clock so the runtime can run against the real world
/// (tokio) or a controlled test clock.
///
/// Only sensor-subscription setup and fix acquisition may await; the
/// predict/correct/metrics/publish chain itself is synchronous.
#[async_trait]
pub trait NavContext: Send + Sync + 'static {
    /// Returns the monotonic time since context creation.
    ///
    /// Used for integration timesteps and pause/resume baselines.
    fn now(&self) -> Duration;

    /// Returns the wall-clock time for snapshot timestamps.
    fn system_time(&self) -> SystemTime;

    /// Suspends execution for the given duration.
    async fn sleep(&self, duration: Duration);
}

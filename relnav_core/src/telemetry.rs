//! Telemetry snapshots for external consumers.
//!
//! One immutable snapshot per completed predict/correct+metrics cycle.
//! Snapshots are handed out behind `Arc`, so readers either see the prior
//! snapshot or the new one in full, never an interleaving.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audit::AuditVerdict;
use crate::metrics::DerivedMetrics;
use crate::state::NavigationState;

/// GPS fix-acquisition status exposed to the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixStatus {
    /// A fix has been acquired and injected
    Acquired,
    /// The receiver reported an error on the last fix attempt
    Error,
    /// No positional source is available
    Unavailable,
}

/// Last known ambient readings, held at their previous value when the
/// corresponding sensor is absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AmbientReadings {
    pub illuminance_lux: Option<f64>,
    pub sound_level_db: Option<f64>,
}

/// A read-only view of the navigation state at publish time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateView {
    /// Latitude (deg), longitude (deg), altitude (m)
    pub position: [f64; 3],
    /// East, north, up velocity (m/s)
    pub velocity: [f64; 3],
    /// Orientation quaternion (w, x, y, z)
    pub orientation: [f64; 4],
}

impl StateView {
    pub fn from_state(state: &NavigationState) -> Self {
        let q = state.orientation.quaternion();
        Self {
            position: [state.position.x, state.position.y, state.position.z],
            velocity: [state.velocity.x, state.velocity.y, state.velocity.z],
            orientation: [q.w, q.i, q.j, q.k],
        }
    }
}

/// The fully-formed output of one pipeline cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Monotonic cycle sequence number
    pub seq: u64,

    /// Wallclock timestamp (ms) from the corrected clock
    pub wallclock_ms: f64,

    pub state: StateView,
    pub metrics: DerivedMetrics,
    pub verdict: AuditVerdict,
    pub fix_status: FixStatus,
    pub ambient: AmbientReadings,
}

/// Assembles immutable snapshots with a monotonic sequence number.
pub struct TelemetryPublisher {
    seq: u64,
}

impl TelemetryPublisher {
    pub fn new() -> Self {
        Self { seq: 0 }
    }

    /// Builds the next snapshot. Called exactly once per completed cycle.
    #[allow(clippy::too_many_arguments)]
    pub fn publish(
        &mut self,
        state: &NavigationState,
        metrics: DerivedMetrics,
        verdict: AuditVerdict,
        fix_status: FixStatus,
        ambient: AmbientReadings,
        wallclock_ms: f64,
    ) -> Arc<TelemetrySnapshot> {
        self.seq += 1;
        Arc::new(TelemetrySnapshot {
            seq: self.seq,
            wallclock_ms,
            state: StateView::from_state(state),
            metrics,
            verdict,
            fix_status,
            ambient,
        })
    }

    /// Sequence number of the most recently published snapshot.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Default for TelemetryPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::CoherenceAuditor;
    use crate::metrics::DerivedMetricsEngine;
    use crate::state::initial_covariance;

    fn sample_cycle() -> (NavigationState, DerivedMetrics, AuditVerdict) {
        let state = NavigationState::seeded(43.3, 5.4, 10.0);
        let metrics = DerivedMetricsEngine::new().update(&state, 0.0, 0.01).unwrap();
        let verdict = CoherenceAuditor::new().evaluate(0.01, &initial_covariance(1e-2));
        (state, metrics, verdict)
    }

    #[test]
    fn test_sequence_is_monotonic() {
        let (state, metrics, verdict) = sample_cycle();
        let mut publisher = TelemetryPublisher::new();

        let s1 = publisher.publish(
            &state, metrics, verdict, FixStatus::Unavailable, AmbientReadings::default(), 0.0,
        );
        let s2 = publisher.publish(
            &state, metrics, verdict, FixStatus::Acquired, AmbientReadings::default(), 10.0,
        );

        assert_eq!(s1.seq, 1);
        assert_eq!(s2.seq, 2);
        assert_eq!(s2.fix_status, FixStatus::Acquired);
    }

    #[test]
    fn test_snapshot_captures_state_view() {
        let (state, metrics, verdict) = sample_cycle();
        let mut publisher = TelemetryPublisher::new();

        let snap = publisher.publish(
            &state, metrics, verdict, FixStatus::Acquired, AmbientReadings::default(), 5.0,
        );

        assert_eq!(snap.state.position, [43.3, 5.4, 10.0]);
        assert_eq!(snap.state.orientation, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_prior_snapshot_untouched_by_next_publish() {
        let (mut state, metrics, verdict) = sample_cycle();
        let mut publisher = TelemetryPublisher::new();

        let first = publisher.publish(
            &state, metrics, verdict, FixStatus::Acquired, AmbientReadings::default(), 0.0,
        );
        state.position.x = 0.0;
        let _second = publisher.publish(
            &state, metrics, verdict, FixStatus::Acquired, AmbientReadings::default(), 1.0,
        );

        // The first snapshot is immutable: later mutation is invisible.
        assert_eq!(first.state.position[0], 43.3);
    }
}

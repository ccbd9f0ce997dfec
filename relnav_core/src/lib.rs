//! RelNav Core - Real-Time Navigation Estimation and Relativistic Telemetry
//!
//! Fuses asynchronous inertial, positional, and barometric samples into one
//! coherent navigation state, derives physical/relativistic quantities from
//! it, and audits the estimate for divergence:
//! 1. **SensorIngest**: validation, dead-zoning, timestep recovery
//! 2. **StateEstimator**: inertial prediction with Coriolis and geodesic
//!    curvature corrections, GPS/barometer correction
//! 3. **DerivedMetricsEngine**: speed, Lorentz factor, proper time, g-force,
//!    drag, accumulated distance
//! 4. **CoherenceAuditor** and **TelemetryPublisher**: verdicts and immutable
//!    per-cycle snapshots

pub mod audit;
pub mod constants;
pub mod error;
pub mod estimator;
pub mod export;
pub mod ingest;
pub mod metrics;
pub mod state;
pub mod telemetry;

// Re-export key types for convenience
pub use audit::{AuditVerdict, CoherenceAuditor};
pub use error::NavError;
pub use estimator::{EstimatorConfig, StateEstimator};
pub use export::{EventLogEntry, SessionExport};
pub use ingest::{IngestedSample, SensorIngest, SensorSample, SensorSource};
pub use metrics::{DerivedMetrics, DerivedMetricsEngine};
pub use state::{NavigationState, STATE_DIM, STATE_LAYOUT_VERSION};
pub use telemetry::{
    AmbientReadings, FixStatus, StateView, TelemetryPublisher, TelemetrySnapshot,
};

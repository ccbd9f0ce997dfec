//! RelNav deterministic runtime harness.
//!
//! Runs the estimator pipeline against reproducible sensor traces. All
//! entropy comes from a single 64-bit seed, so any run can be replayed
//! exactly from its seed.
//!
//! # Architecture
//!
//! ```text
//!  MotionOracle ──► SensorTrace ──► producers ──┐
//!                                               │  mpsc (funnel)
//!  pause / resume / shutdown ───────────────────┤
//!                                               ▼
//!                                     Pipeline (single consumer,
//!                                      owns the StateEstimator)
//!                                               │  watch
//!                                               ▼
//!                                     Arc<TelemetrySnapshot>
//! ```
//!
//! Only one task ever mutates the navigation state; everything else
//! observes it through immutable snapshots.

pub mod oracle;
pub mod pipeline;
pub mod runner;
pub mod scenarios;

pub use oracle::{MotionOracle, MotionProfile, NoiseModel, SensorTrace, TraceConfig};
pub use pipeline::{Pipeline, PipelineEvent};
pub use runner::{run_scenario, RunConfig, RunSummary};
pub use scenarios::ScenarioId;

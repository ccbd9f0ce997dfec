//! Error types for the estimation pipeline.
//!
//! The pipeline is best-effort by design: every sensor-facing failure is
//! recovered locally (sample dropped, previous state retained, or a fallback
//! constant substituted). Only [`NavError::SuperluminalSpeed`] represents an
//! estimator-level inconsistency that callers must surface rather than mask.

use thiserror::Error;

/// Errors that can occur in the estimation pipeline.
#[derive(Debug, Clone, Error)]
pub enum NavError {
    /// A sensor sample was malformed (missing or non-finite fields).
    /// The sample is dropped; the previous state is retained unchanged.
    #[error("invalid {sensor} sample: {reason}")]
    InvalidSample { sensor: &'static str, reason: String },

    /// A sensor delivered a non-positive delta-time. Recovered by
    /// substituting the default timestep; reported for observability.
    #[error("non-positive timestep {dt_s} s, substituted default")]
    NonPositiveTimestep { dt_s: f64 },

    /// A sensor is absent or permission was denied. Constructed by platform
    /// sensor adapters feeding the pipeline; the simulator synthesizes every
    /// source, so it never raises this. The pipeline degrades to
    /// reduced-fidelity operation; never fatal.
    #[error("sensor unavailable: {0}")]
    SensorUnavailable(String),

    /// The velocity estimate reached or exceeded light speed, for which the
    /// Lorentz factor is undefined. This indicates sensor corruption or a
    /// unit error upstream and is never silently clamped.
    #[error("speed {speed_m_s} m/s is at or above light speed")]
    SuperluminalSpeed { speed_m_s: f64 },
}

impl NavError {
    /// Creates an invalid-sample error.
    pub fn invalid(sensor: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSample {
            sensor,
            reason: reason.into(),
        }
    }

    /// Returns true if the error is recoverable without operator attention.
    ///
    /// Everything except a superluminal speed estimate is recovered locally
    /// with a documented fallback.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::SuperluminalSpeed { .. })
    }
}

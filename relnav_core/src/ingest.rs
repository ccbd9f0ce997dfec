//! Sensor ingest: normalizes raw platform events into typed samples.
//!
//! Ingest never mutates shared state. It validates fields, computes per-source
//! delta-times, substitutes the default timestep when a clock misbehaves, and
//! applies the acceleration dead-zone filter before anything reaches the
//! estimator.

use serde::{Deserialize, Serialize};

use crate::constants::{ACCEL_DEAD_ZONE_M_S2, DEFAULT_TIMESTEP_S};
use crate::error::NavError;

/// A normalized, timestamped sensor sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SensorSample {
    /// Linear acceleration (m/s²), device frame
    Accelerometer { x: f64, y: f64, z: f64, t_ms: f64 },

    /// Angular rate (rad/s), device frame
    Gyroscope { x: f64, y: f64, z: f64, t_ms: f64 },

    /// Positional fix: geodetic latitude/longitude (deg), altitude (m)
    GpsFix { lat: f64, lon: f64, alt: f64, t_ms: f64 },

    /// Barometric pressure (hPa)
    Barometer { h_pa: f64, t_ms: f64 },

    /// Ambient illuminance (lux) and sound level (dB)
    Ambient { lux: f64, db: f64, t_ms: f64 },
}

impl SensorSample {
    /// The sample's source tag, used for per-source timestamp tracking.
    pub fn source(&self) -> SensorSource {
        match self {
            Self::Accelerometer { .. } => SensorSource::Accelerometer,
            Self::Gyroscope { .. } => SensorSource::Gyroscope,
            Self::GpsFix { .. } => SensorSource::Gps,
            Self::Barometer { .. } => SensorSource::Barometer,
            Self::Ambient { .. } => SensorSource::Ambient,
        }
    }

    /// The sample timestamp in milliseconds.
    pub fn timestamp_ms(&self) -> f64 {
        match *self {
            Self::Accelerometer { t_ms, .. }
            | Self::Gyroscope { t_ms, .. }
            | Self::GpsFix { t_ms, .. }
            | Self::Barometer { t_ms, .. }
            | Self::Ambient { t_ms, .. } => t_ms,
        }
    }

    fn fields(&self) -> [f64; 4] {
        match *self {
            Self::Accelerometer { x, y, z, t_ms } | Self::Gyroscope { x, y, z, t_ms } => {
                [x, y, z, t_ms]
            }
            Self::GpsFix { lat, lon, alt, t_ms } => [lat, lon, alt, t_ms],
            Self::Barometer { h_pa, t_ms } => [h_pa, 0.0, 0.0, t_ms],
            Self::Ambient { lux, db, t_ms } => [lux, db, 0.0, t_ms],
        }
    }
}

/// Identifies an independent sensor source with its own monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorSource {
    Accelerometer,
    Gyroscope,
    Gps,
    Barometer,
    Ambient,
}

impl SensorSource {
    fn index(self) -> usize {
        match self {
            Self::Accelerometer => 0,
            Self::Gyroscope => 1,
            Self::Gps => 2,
            Self::Barometer => 3,
            Self::Ambient => 4,
        }
    }

    /// Human-readable tag for error reporting.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Accelerometer => "accelerometer",
            Self::Gyroscope => "gyroscope",
            Self::Gps => "gps",
            Self::Barometer => "barometer",
            Self::Ambient => "ambient",
        }
    }
}

/// A validated sample together with its integration timestep.
#[derive(Debug, Clone)]
pub struct IngestedSample {
    /// The dead-zoned, validated sample
    pub sample: SensorSample,

    /// Seconds elapsed since the previous sample from the same source
    pub dt_s: f64,

    /// The recovered fault when the source delivered a non-positive delta
    /// and the default timestep was substituted
    pub recovered: Option<NavError>,
}

/// Normalizes raw sensor events into [`IngestedSample`]s.
pub struct SensorIngest {
    /// Last accepted timestamp per source (ms)
    last_t_ms: [Option<f64>; 5],

    /// Count of default-timestep substitutions, for observability
    recovered_timesteps: u64,
}

impl SensorIngest {
    pub fn new() -> Self {
        Self {
            last_t_ms: [None; 5],
            recovered_timesteps: 0,
        }
    }

    /// Validates and normalizes one sample.
    ///
    /// Rejects samples with non-finite fields. A non-positive computed
    /// delta-time is not a rejection: the default timestep is substituted so
    /// that clock noise never halts the pipeline.
    pub fn normalize(&mut self, sample: SensorSample) -> Result<IngestedSample, NavError> {
        let source = sample.source();
        if sample.fields().iter().any(|f| !f.is_finite()) {
            return Err(NavError::invalid(source.tag(), "non-finite field"));
        }

        let t_ms = sample.timestamp_ms();
        let idx = source.index();
        let raw_dt_s = match self.last_t_ms[idx] {
            Some(prev) => (t_ms - prev) / 1000.0,
            // First sample from this source: fall back to the default step.
            None => DEFAULT_TIMESTEP_S,
        };

        let (dt_s, recovered) = if raw_dt_s > 0.0 {
            (raw_dt_s, None)
        } else {
            self.recovered_timesteps += 1;
            (
                DEFAULT_TIMESTEP_S,
                Some(NavError::NonPositiveTimestep { dt_s: raw_dt_s }),
            )
        };
        self.last_t_ms[idx] = Some(t_ms);

        Ok(IngestedSample {
            sample: dead_zone(sample),
            dt_s,
            recovered,
        })
    }

    /// Forgets all per-source timestamp baselines.
    ///
    /// Called on resume so that idle time is not integrated as motion.
    pub fn reset_baselines(&mut self) {
        self.last_t_ms = [None; 5];
    }

    /// Number of default-timestep substitutions since session start.
    pub fn recovered_timesteps(&self) -> u64 {
        self.recovered_timesteps
    }
}

impl Default for SensorIngest {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamps sub-threshold acceleration axes to exactly zero.
fn dead_zone(sample: SensorSample) -> SensorSample {
    match sample {
        SensorSample::Accelerometer { x, y, z, t_ms } => SensorSample::Accelerometer {
            x: clamp_axis(x),
            y: clamp_axis(y),
            z: clamp_axis(z),
            t_ms,
        },
        other => other,
    }
}

fn clamp_axis(a: f64) -> f64 {
    if a.abs() < ACCEL_DEAD_ZONE_M_S2 {
        0.0
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_zone_clamps_small_axes() {
        let mut ingest = SensorIngest::new();
        let out = ingest
            .normalize(SensorSample::Accelerometer {
                x: 0.001,
                y: -0.0049,
                z: 1.2,
                t_ms: 10.0,
            })
            .unwrap();

        match out.sample {
            SensorSample::Accelerometer { x, y, z, .. } => {
                assert_eq!(x, 0.0);
                assert_eq!(y, 0.0);
                assert_eq!(z, 1.2);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_non_finite_sample_rejected() {
        let mut ingest = SensorIngest::new();
        let result = ingest.normalize(SensorSample::GpsFix {
            lat: f64::NAN,
            lon: 5.4,
            alt: 10.0,
            t_ms: 100.0,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_delta_time_per_source() {
        let mut ingest = SensorIngest::new();
        let first = ingest
            .normalize(SensorSample::Accelerometer { x: 0.0, y: 0.0, z: 0.0, t_ms: 0.0 })
            .unwrap();
        assert_eq!(first.dt_s, DEFAULT_TIMESTEP_S);

        let second = ingest
            .normalize(SensorSample::Accelerometer { x: 0.0, y: 0.0, z: 0.0, t_ms: 25.0 })
            .unwrap();
        assert!((second.dt_s - 0.025).abs() < 1e-12);
        assert!(second.recovered.is_none());

        // A barometer sample does not share the accelerometer clock.
        let baro = ingest
            .normalize(SensorSample::Barometer { h_pa: 1010.0, t_ms: 1.0 })
            .unwrap();
        assert_eq!(baro.dt_s, DEFAULT_TIMESTEP_S);
    }

    #[test]
    fn test_non_positive_delta_substitutes_default() {
        let mut ingest = SensorIngest::new();
        ingest
            .normalize(SensorSample::Gyroscope { x: 0.0, y: 0.0, z: 0.0, t_ms: 50.0 })
            .unwrap();
        let stale = ingest
            .normalize(SensorSample::Gyroscope { x: 0.0, y: 0.0, z: 0.0, t_ms: 50.0 })
            .unwrap();

        assert!(matches!(
            stale.recovered,
            Some(NavError::NonPositiveTimestep { dt_s }) if dt_s == 0.0
        ));
        assert_eq!(stale.dt_s, DEFAULT_TIMESTEP_S);
        assert_eq!(ingest.recovered_timesteps(), 1);
    }

    #[test]
    fn test_reset_baselines_forgets_clocks() {
        let mut ingest = SensorIngest::new();
        ingest
            .normalize(SensorSample::Accelerometer { x: 0.0, y: 0.0, z: 0.0, t_ms: 1000.0 })
            .unwrap();
        ingest.reset_baselines();

        // After reset, a much later sample uses the default step instead of
        // integrating the idle gap.
        let resumed = ingest
            .normalize(SensorSample::Accelerometer { x: 0.0, y: 0.0, z: 0.0, t_ms: 60_000.0 })
            .unwrap();
        assert_eq!(resumed.dt_s, DEFAULT_TIMESTEP_S);
    }
}

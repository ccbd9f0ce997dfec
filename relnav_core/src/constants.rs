//! Physical constants used by the estimator and the derived-metrics engine.
//!
//! All dynamics run in SI units on `f64`; conversion to display units
//! (km/h, fixed-decimal strings) happens only at the presentation boundary.

/// Speed of light in vacuum (m/s).
///
/// Source: CODATA 2018 exact value.
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Earth's sidereal rotation rate (rad/s).
///
/// Used for the Coriolis correction term during inertial prediction.
pub const EARTH_ROTATION_RATE_RAD_S: f64 = 7.292_115e-5;

/// Mean Earth radius (m), spherical approximation.
///
/// Used for the geodesic curvature correction during position integration.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Standard gravitational acceleration (m/s²).
///
/// Source: ISO 80000-3.
pub const STANDARD_GRAVITY_M_S2: f64 = 9.806_65;

/// Air density at sea level, 15 °C (kg/m³).
///
/// Source: International Standard Atmosphere.
pub const AIR_DENSITY_KG_M3: f64 = 1.225;

/// Standard atmospheric pressure at sea level (hPa).
///
/// Reference pressure for the hypsometric altitude conversion.
pub const SEA_LEVEL_PRESSURE_HPA: f64 = 1013.25;

/// Drag coefficient times reference area (m²), placeholder aerodynamic figure.
pub const DRAG_CD_AREA_M2: f64 = 0.3;

/// Nominal speed of sound at sea level (km/h).
///
/// Overridden by the ephemeris collaborator's temperature-corrected value
/// when one is available.
pub const NOMINAL_SOUND_SPEED_KM_H: f64 = 1234.8;

/// Dead-zone threshold for linear acceleration (m/s²).
///
/// Any axis reading below this magnitude is clamped to exactly zero before
/// integration, suppressing bias drift from a stationary platform.
pub const ACCEL_DEAD_ZONE_M_S2: f64 = 0.005;

/// Fallback integration timestep (s) substituted when a sensor delivers a
/// non-positive delta-time. Sensor clock noise must never halt estimation.
pub const DEFAULT_TIMESTEP_S: f64 = 0.010;

/// Bias-error constant for the coherence audit's drift model.
pub const AUDIT_BIAS_ERROR: f64 = 0.001;

/// Uncertainty threshold above which the audit flags divergence.
pub const AUDIT_COHERENCE_THRESHOLD: f64 = 0.005;

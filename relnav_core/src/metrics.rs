//! Presentation-independent physical and relativistic quantities derived
//! from the navigation state.
//!
//! Instantaneous values are pure functions of the state; the engine itself
//! holds only the session accumulators (proper time, distance, peak g-force).

use serde::{Deserialize, Serialize};

use crate::constants::{
    AIR_DENSITY_KG_M3, DRAG_CD_AREA_M2, NOMINAL_SOUND_SPEED_KM_H, SPEED_OF_LIGHT_M_S,
    STANDARD_GRAVITY_M_S2,
};
use crate::error::NavError;
use crate::state::NavigationState;

/// One tick's worth of derived quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Ground speed (m/s)
    pub speed_m_s: f64,

    /// Ground speed (km/h)
    pub speed_km_h: f64,

    /// Lorentz factor γ = 1/√(1−(v/c)²)
    pub lorentz_factor: f64,

    /// Accumulated proper time τ (s)
    pub proper_time_s: f64,

    /// Instantaneous time-dilation rate, (γ−1)×1e9 (ns/s)
    pub time_dilation_ns_s: f64,

    /// Instantaneous g-force, a/g₀ + 1
    pub g_force: f64,

    /// Session-scoped running maximum g-force (monotone non-decreasing)
    pub peak_g_force: f64,

    /// Rate of change of g-force over the last tick (g/s)
    pub jerk_g_s: f64,

    /// Aerodynamic drag force ½·ρ·v²·Cd·A (N)
    pub drag_force_n: f64,

    /// Speed as a percentage of the local speed of sound
    pub percent_sound_speed: f64,

    /// Distance accumulated over the session (m)
    pub distance_m: f64,
}

/// Computes [`DerivedMetrics`] and carries the session accumulators.
pub struct DerivedMetricsEngine {
    elapsed_s: f64,
    proper_time_s: f64,
    distance_m: f64,
    peak_g: f64,
    last_g: f64,
    sound_speed_m_s: f64,
}

impl DerivedMetricsEngine {
    pub fn new() -> Self {
        Self {
            elapsed_s: 0.0,
            proper_time_s: 0.0,
            distance_m: 0.0,
            peak_g: 0.0,
            last_g: 1.0,
            sound_speed_m_s: NOMINAL_SOUND_SPEED_KM_H / 3.6,
        }
    }

    /// Replaces the nominal sound speed with an externally corrected value
    /// (e.g. temperature-corrected by the ephemeris collaborator).
    pub fn set_sound_speed_m_s(&mut self, sound_speed_m_s: f64) {
        if sound_speed_m_s.is_finite() && sound_speed_m_s > 0.0 {
            self.sound_speed_m_s = sound_speed_m_s;
        }
    }

    /// Wallclock time integrated so far (s).
    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    /// Accumulated proper time τ (s).
    pub fn proper_time_s(&self) -> f64 {
        self.proper_time_s
    }

    /// Session peak g-force so far.
    pub fn peak_g_force(&self) -> f64 {
        self.peak_g
    }

    /// Distance accumulated so far (m).
    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    /// Advances the accumulators by one tick and derives the metrics.
    ///
    /// `accel_m_s2` is the magnitude of the corrected linear acceleration
    /// from the estimator's last prediction. A speed at or above light speed
    /// is a domain error, surfaced rather than clamped: it signals sensor
    /// corruption or a unit error upstream.
    pub fn update(
        &mut self,
        state: &NavigationState,
        accel_m_s2: f64,
        dt_s: f64,
    ) -> Result<DerivedMetrics, NavError> {
        let speed = state.speed();
        let gamma = lorentz_factor(speed)?;
        let dt_s = dt_s.max(0.0);

        self.elapsed_s += dt_s;
        self.proper_time_s += dt_s / gamma;
        self.distance_m += speed * dt_s;

        let g_force = accel_m_s2 / STANDARD_GRAVITY_M_S2 + 1.0;
        if g_force > self.peak_g {
            self.peak_g = g_force;
        }
        let jerk = if dt_s > 0.0 {
            (g_force - self.last_g) / dt_s
        } else {
            0.0
        };
        self.last_g = g_force;

        Ok(DerivedMetrics {
            speed_m_s: speed,
            speed_km_h: speed * 3.6,
            lorentz_factor: gamma,
            proper_time_s: self.proper_time_s,
            time_dilation_ns_s: (gamma - 1.0) * 1e9,
            g_force,
            peak_g_force: self.peak_g,
            jerk_g_s: jerk,
            drag_force_n: 0.5 * AIR_DENSITY_KG_M3 * speed * speed * DRAG_CD_AREA_M2,
            percent_sound_speed: speed / self.sound_speed_m_s * 100.0,
            distance_m: self.distance_m,
        })
    }
}

impl Default for DerivedMetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Lorentz factor for the given speed.
///
/// Defined and finite only for `v < c`; anything at or above light speed is
/// a domain error.
pub fn lorentz_factor(speed_m_s: f64) -> Result<f64, NavError> {
    if !speed_m_s.is_finite() || speed_m_s >= SPEED_OF_LIGHT_M_S {
        return Err(NavError::SuperluminalSpeed { speed_m_s });
    }
    let beta = speed_m_s / SPEED_OF_LIGHT_M_S;
    Ok(1.0 / (1.0 - beta * beta).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn state_with_speed(v: f64) -> NavigationState {
        let mut s = NavigationState::seeded(0.0, 0.0, 0.0);
        s.velocity = Vector3::new(v, 0.0, 0.0);
        s
    }

    #[test]
    fn test_gamma_at_rest_is_exactly_one() {
        assert_relative_eq!(lorentz_factor(0.0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gamma_strictly_increasing() {
        let mut prev = lorentz_factor(0.0).unwrap();
        for v in [1.0, 1e3, 1e6, 1e8, 2.9e8] {
            let gamma = lorentz_factor(v).unwrap();
            assert!(gamma > prev, "gamma must grow with speed");
            prev = gamma;
        }
    }

    #[test]
    fn test_gamma_superluminal_is_domain_error() {
        assert!(lorentz_factor(SPEED_OF_LIGHT_M_S).is_err());
        assert!(lorentz_factor(SPEED_OF_LIGHT_M_S * 2.0).is_err());
        assert!(lorentz_factor(f64::INFINITY).is_err());
    }

    #[test]
    fn test_proper_time_at_rest_equals_wallclock() {
        let mut engine = DerivedMetricsEngine::new();
        let state = state_with_speed(0.0);

        for _ in 0..100 {
            engine.update(&state, 0.0, 0.01).unwrap();
        }

        assert_relative_eq!(engine.proper_time_s(), engine.elapsed_s(), epsilon = 1e-12);
        assert_relative_eq!(engine.elapsed_s(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_speed_conversion_and_drag() {
        let mut engine = DerivedMetricsEngine::new();
        let m = engine.update(&state_with_speed(10.0), 0.0, 0.01).unwrap();

        assert_relative_eq!(m.speed_km_h, 36.0, epsilon = 1e-12);
        assert_relative_eq!(
            m.drag_force_n,
            0.5 * AIR_DENSITY_KG_M3 * 100.0 * DRAG_CD_AREA_M2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_peak_g_is_monotone() {
        let mut engine = DerivedMetricsEngine::new();
        let state = state_with_speed(0.0);

        let accels = [2.0, 8.0, 3.0, 1.0, 7.9, 0.0];
        let mut peaks = Vec::new();
        for a in accels {
            let m = engine.update(&state, a, 0.01).unwrap();
            peaks.push(m.peak_g_force);
        }

        for pair in peaks.windows(2) {
            assert!(pair[1] >= pair[0], "peak g-force must never decrease");
        }
        assert_relative_eq!(
            peaks.last().copied().unwrap(),
            8.0 / STANDARD_GRAVITY_M_S2 + 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_distance_accumulates_rectangularly() {
        let mut engine = DerivedMetricsEngine::new();
        let state = state_with_speed(5.0);

        for _ in 0..200 {
            engine.update(&state, 0.0, 0.01).unwrap();
        }

        let m = engine.update(&state, 0.0, 0.0).unwrap();
        assert_relative_eq!(m.distance_m, 10.0, max_relative = 1e-9);
    }

    #[test]
    fn test_percent_sound_speed_uses_corrected_value() {
        let mut engine = DerivedMetricsEngine::new();
        engine.set_sound_speed_m_s(340.0);
        let m = engine.update(&state_with_speed(170.0), 0.0, 0.01).unwrap();
        assert_relative_eq!(m.percent_sound_speed, 50.0, epsilon = 1e-9);

        // Garbage corrections are ignored, not applied.
        engine.set_sound_speed_m_s(f64::NAN);
        let m = engine.update(&state_with_speed(170.0), 0.0, 0.01).unwrap();
        assert_relative_eq!(m.percent_sound_speed, 50.0, epsilon = 1e-9);
    }
}

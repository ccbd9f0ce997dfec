//! The navigation state estimator.
//!
//! Prediction integrates bias- and scale-corrected inertial data with a
//! Coriolis term and a geodesic curvature correction; orientation follows
//! `q̇ = ½·q⊗ω` with gyro-bias-corrected rates. Correction injects GPS fixes
//! directly into the position components (a documented simplification of a
//! gain-weighted update) and blends barometric vertical rate into the
//! vertical velocity.
//!
//! Failure semantics: malformed input returns an error and leaves the
//! previous state untouched. The estimator never panics on sensor data.

use nalgebra::{DMatrix, Quaternion, UnitQuaternion, Vector3};

use crate::constants::{
    DEFAULT_TIMESTEP_S, EARTH_RADIUS_M, EARTH_ROTATION_RATE_RAD_S,
};
use crate::error::NavError;
use crate::state::{
    covariance_is_well_formed, initial_covariance, NavigationState, POS_IDX, STATE_DIM, VEL_IDX,
};

/// Tuning parameters for the estimator.
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    /// Reference latitude (deg) at which the Coriolis term is evaluated
    pub reference_latitude_deg: f64,

    /// Initial covariance diagonal scale
    pub initial_covariance: f64,

    /// Process noise added to the velocity diagonal per second
    pub velocity_process_noise: f64,

    /// Process noise added to the position diagonal per second
    pub position_process_noise: f64,

    /// Position variance seeded after a direct GPS injection
    pub gps_position_variance: f64,

    /// Blend gain applied to the barometric vertical-rate residual
    pub baro_blend_gain: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            reference_latitude_deg: 45.0,
            initial_covariance: 1e-2,
            velocity_process_noise: 1e-3,
            position_process_noise: 1e-6,
            gps_position_variance: 25.0,
            baro_blend_gain: 0.2,
        }
    }
}

/// Owns the navigation state and covariance for one session.
///
/// There is exactly one estimator per session; callers inject it as an
/// explicit dependency. Single-writer discipline is enforced structurally by
/// the runtime's event funnel, so no interior locking is needed here.
pub struct StateEstimator {
    config: EstimatorConfig,
    state: NavigationState,
    covariance: DMatrix<f64>,

    /// Corrected linear acceleration from the last prediction, for g-force
    last_accel: Vector3<f64>,

    /// Hypsometric altitude and timestamp of the previous barometer sample
    last_baro: Option<(f64, f64)>,
}

impl StateEstimator {
    /// Creates an estimator seeded at the given geodetic position.
    pub fn new(config: EstimatorConfig, seed: NavigationState) -> Self {
        let covariance = initial_covariance(config.initial_covariance);
        Self {
            config,
            state: seed,
            covariance,
            last_accel: Vector3::zeros(),
            last_baro: None,
        }
    }

    /// Read-only view of the current state.
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Read-only view of the current covariance.
    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    /// Corrected linear acceleration from the most recent prediction (m/s²).
    pub fn last_accel(&self) -> Vector3<f64> {
        self.last_accel
    }

    /// Clears per-sensor integration baselines.
    ///
    /// Called on resume so an idle gap is not replayed as motion.
    pub fn reset_baseline(&mut self) {
        self.last_baro = None;
        self.last_accel = Vector3::zeros();
    }

    /// Advances the state by `dt` seconds using inertial data.
    ///
    /// `accel` must already be dead-zoned by ingest; bias and scale
    /// correction happen here. A non-positive `dt` is recovered with the
    /// default timestep.
    pub fn predict(
        &mut self,
        accel: Vector3<f64>,
        gyro: Vector3<f64>,
        dt: f64,
    ) -> Result<(), NavError> {
        if accel.iter().chain(gyro.iter()).any(|v| !v.is_finite()) || !dt.is_finite() {
            return Err(NavError::invalid("inertial", "non-finite prediction input"));
        }
        let dt = if dt > 0.0 { dt } else { DEFAULT_TIMESTEP_S };

        let prev = self.state.clone();

        // Bias and per-axis scale correction.
        let mut a = (accel - self.state.accel_bias).component_mul(&self.state.accel_scale);
        let w = (gyro - self.state.gyro_bias).component_mul(&self.state.gyro_scale);

        // Coriolis: apparent deflection of the along-track (north) component
        // driven by the lateral (east) velocity at the reference latitude.
        let lat_ref = self.config.reference_latitude_deg.to_radians();
        let coriolis = 2.0 * EARTH_ROTATION_RATE_RAD_S * lat_ref.sin() * self.state.velocity.x;
        a.y += coriolis;
        self.state.coriolis_accel = coriolis;

        self.state.velocity += a * dt;

        // Orientation: q̇ = ½·q⊗ω, renormalized every step.
        let q = self.state.orientation.into_inner();
        let omega = Quaternion::new(0.0, w.x, w.y, w.z);
        let q_new = q + q * omega * 0.5 * dt;
        self.state.orientation = UnitQuaternion::from_quaternion(q_new);

        // Position: the local tangent frame rotates by θ = v_lateral·dt/R
        // over the step, so rotate the in-plane displacement before adding
        // the vertical component.
        let theta = self.state.velocity.x * dt / EARTH_RADIUS_M;
        let de = self.state.velocity.x * dt;
        let dn = self.state.velocity.y * dt;
        let (sin_t, cos_t) = theta.sin_cos();
        let de_rot = de * cos_t - dn * sin_t;
        let dn_rot = de * sin_t + dn * cos_t;

        let lat_rad = self.state.position.x.to_radians();
        self.state.position.x += (dn_rot / EARTH_RADIUS_M).to_degrees();
        self.state.position.y += (de_rot / (EARTH_RADIUS_M * lat_rad.cos())).to_degrees();
        self.state.position.z += self.state.velocity.z * dt;

        // Commit the covariance and accumulator only for a valid state, so
        // a rolled-back prediction leaves every estimator field untouched.
        if !self.state.is_valid() {
            self.state = prev;
            return Err(NavError::invalid("inertial", "prediction produced non-finite state"));
        }

        self.propagate_covariance(dt);
        self.last_accel = a;
        Ok(())
    }

    /// Overwrites the position components with a GPS fix.
    ///
    /// Direct injection: the predicted position is discarded for these
    /// components and the position covariance block is re-seeded to the GPS
    /// measurement variance, which keeps the matrix symmetric PSD.
    pub fn correct_with_fix(&mut self, lat: f64, lon: f64, alt: f64) -> Result<(), NavError> {
        if !lat.is_finite() || !lon.is_finite() || !alt.is_finite() {
            return Err(NavError::invalid("gps", "non-finite fix coordinate"));
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(NavError::invalid("gps", "fix coordinates out of range"));
        }

        self.state.position = Vector3::new(lat, lon, alt);
        self.reseed_position_covariance(self.config.gps_position_variance);
        Ok(())
    }

    /// Blends a barometric vertical-rate observation into the vertical
    /// velocity via the hypsometric pressure-to-altitude relation.
    pub fn correct_with_pressure(&mut self, h_pa: f64, t_ms: f64) -> Result<(), NavError> {
        if !h_pa.is_finite() || h_pa <= 0.0 {
            return Err(NavError::invalid("barometer", "non-positive pressure"));
        }

        let alt = hypsometric_altitude_m(h_pa);
        if let Some((prev_alt, prev_t_ms)) = self.last_baro {
            let dt_s = (t_ms - prev_t_ms) / 1000.0;
            let dt_s = if dt_s > 0.0 { dt_s } else { DEFAULT_TIMESTEP_S };
            let rate = (alt - prev_alt) / dt_s;

            self.state.baro_vertical_rate = rate;
            self.state.velocity.z += self.config.baro_blend_gain * (rate - self.state.velocity.z);
        }
        self.last_baro = Some((alt, t_ms));
        Ok(())
    }

    /// `P ← F·P·Fᵀ + Q` with a constant-velocity transition applied to the
    /// position/velocity blocks.
    fn propagate_covariance(&mut self, dt: f64) {
        let mut f = DMatrix::identity(STATE_DIM, STATE_DIM);
        let deg_per_m = (1.0 / EARTH_RADIUS_M).to_degrees();
        let lat_rad = self.state.position.x.to_radians();

        // lat ← v_north, lon ← v_east, alt ← v_up
        f[(POS_IDX, VEL_IDX + 1)] = dt * deg_per_m;
        f[(POS_IDX + 1, VEL_IDX)] = dt * deg_per_m / lat_rad.cos();
        f[(POS_IDX + 2, VEL_IDX + 2)] = dt;

        let mut p = &f * &self.covariance * f.transpose();
        for i in 0..3 {
            p[(POS_IDX + i, POS_IDX + i)] += self.config.position_process_noise * dt;
            p[(VEL_IDX + i, VEL_IDX + i)] += self.config.velocity_process_noise * dt;
        }
        self.covariance = p;

        debug_assert!(covariance_is_well_formed(&self.covariance));
    }

    /// Zeroes the cross terms of the position block and seeds its diagonal.
    fn reseed_position_covariance(&mut self, variance: f64) {
        for i in POS_IDX..POS_IDX + 3 {
            for j in 0..STATE_DIM {
                if i != j {
                    self.covariance[(i, j)] = 0.0;
                    self.covariance[(j, i)] = 0.0;
                }
            }
            self.covariance[(i, i)] = variance;
        }
        debug_assert!(covariance_is_well_formed(&self.covariance));
    }
}

/// Altitude (m) from pressure (hPa) via the hypsometric relation for the
/// standard atmosphere.
pub fn hypsometric_altitude_m(h_pa: f64) -> f64 {
    use crate::constants::SEA_LEVEL_PRESSURE_HPA;
    44_330.0 * (1.0 - (h_pa / SEA_LEVEL_PRESSURE_HPA).powf(1.0 / 5.255))
}

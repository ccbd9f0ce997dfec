//! Navigation state vector and covariance.
//!
//! One estimator service owns one state with one documented layout. The
//! layout is versioned so exported sessions can be interpreted unambiguously.

use nalgebra::{DMatrix, DVector, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Version of the state-vector layout below. Bump when indices change.
pub const STATE_LAYOUT_VERSION: u32 = 1;

/// Dimensionality of the flattened state vector.
///
/// Layout (version 1):
/// - `[0..3)`   position: geodetic latitude (deg), longitude (deg), altitude (m)
/// - `[3..6)`   velocity: east, north, up (m/s)
/// - `[6..10)`  orientation quaternion: w, x, y, z (unit norm)
/// - `[10..13)` accelerometer bias (m/s²)
/// - `[13..16)` gyroscope bias (rad/s)
/// - `[16..19)` accelerometer per-axis scale factors
/// - `[19..22)` gyroscope per-axis scale factors
/// - `[22]`     barometric vertical-rate estimate (m/s)
/// - `[23]`     last applied Coriolis acceleration (m/s²)
pub const STATE_DIM: usize = 24;

/// Index of the first position component in the flattened layout.
pub const POS_IDX: usize = 0;
/// Index of the first velocity component in the flattened layout.
pub const VEL_IDX: usize = 3;

/// The full navigation state.
///
/// Mutated exclusively by the estimator for the life of a session; all other
/// components only ever read a fully committed copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationState {
    /// Geodetic position: latitude (deg), longitude (deg), altitude (m)
    pub position: Vector3<f64>,

    /// Velocity in the local tangent frame: east, north, up (m/s)
    pub velocity: Vector3<f64>,

    /// Body orientation relative to the local tangent frame
    pub orientation: UnitQuaternion<f64>,

    /// Accelerometer bias estimate (m/s²)
    pub accel_bias: Vector3<f64>,

    /// Gyroscope bias estimate (rad/s)
    pub gyro_bias: Vector3<f64>,

    /// Accelerometer per-axis scale factors (unitless, nominally 1.0)
    pub accel_scale: Vector3<f64>,

    /// Gyroscope per-axis scale factors (unitless, nominally 1.0)
    pub gyro_scale: Vector3<f64>,

    /// Vertical rate derived from barometric pressure (m/s)
    pub baro_vertical_rate: f64,

    /// Coriolis acceleration applied on the last prediction (m/s²)
    pub coriolis_accel: f64,
}

impl NavigationState {
    /// Creates the initial state at a position seed with zero velocity,
    /// identity orientation, and nominal bias/scale terms.
    pub fn seeded(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            position: Vector3::new(latitude_deg, longitude_deg, altitude_m),
            velocity: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            accel_bias: Vector3::zeros(),
            gyro_bias: Vector3::zeros(),
            accel_scale: Vector3::new(1.0, 1.0, 1.0),
            gyro_scale: Vector3::new(1.0, 1.0, 1.0),
            baro_vertical_rate: 0.0,
            coriolis_accel: 0.0,
        }
    }

    /// Flattens the state into the versioned layout.
    pub fn to_vector(&self) -> DVector<f64> {
        let mut v = DVector::zeros(STATE_DIM);
        v.fixed_rows_mut::<3>(0).copy_from(&self.position);
        v.fixed_rows_mut::<3>(3).copy_from(&self.velocity);
        let q = self.orientation.quaternion();
        v[6] = q.w;
        v[7] = q.i;
        v[8] = q.j;
        v[9] = q.k;
        v.fixed_rows_mut::<3>(10).copy_from(&self.accel_bias);
        v.fixed_rows_mut::<3>(13).copy_from(&self.gyro_bias);
        v.fixed_rows_mut::<3>(16).copy_from(&self.accel_scale);
        v.fixed_rows_mut::<3>(19).copy_from(&self.gyro_scale);
        v[22] = self.baro_vertical_rate;
        v[23] = self.coriolis_accel;
        v
    }

    /// Ground speed magnitude (m/s).
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Returns true if every component is finite and the quaternion has
    /// unit norm (within floating tolerance).
    pub fn is_valid(&self) -> bool {
        let finite = self.to_vector().iter().all(|x| x.is_finite());
        let unit = (self.orientation.quaternion().norm() - 1.0).abs() < 1e-9;
        finite && unit
    }
}

/// Creates the initial covariance: identity scaled by a small constant.
pub fn initial_covariance(scale: f64) -> DMatrix<f64> {
    DMatrix::identity(STATE_DIM, STATE_DIM) * scale
}

/// Returns the mean variance of the 3×3 position block's diagonal.
///
/// The square root of this figure is the deterministic position accuracy
/// reported by the coherence audit.
pub fn position_block_variance(covariance: &DMatrix<f64>) -> f64 {
    covariance.view((POS_IDX, POS_IDX), (3, 3)).trace() / 3.0
}

/// Checks symmetry and non-negative diagonal, the cheap proxies for the
/// positive semi-definite invariant.
pub fn covariance_is_well_formed(covariance: &DMatrix<f64>) -> bool {
    if covariance.nrows() != STATE_DIM || covariance.ncols() != STATE_DIM {
        return false;
    }
    for i in 0..STATE_DIM {
        if covariance[(i, i)] < 0.0 || !covariance[(i, i)].is_finite() {
            return false;
        }
        for j in (i + 1)..STATE_DIM {
            if (covariance[(i, j)] - covariance[(j, i)]).abs() > 1e-9 {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_seeded_state_is_valid() {
        let state = NavigationState::seeded(43.3, 5.4, 10.0);
        assert!(state.is_valid());
        assert_eq!(state.speed(), 0.0);
        assert_relative_eq!(state.accel_scale.x, 1.0);
    }

    #[test]
    fn test_vector_layout_roundtrip_fields() {
        let mut state = NavigationState::seeded(1.0, 2.0, 3.0);
        state.velocity = Vector3::new(4.0, 5.0, 6.0);
        state.baro_vertical_rate = 0.7;

        let v = state.to_vector();
        assert_eq!(v.len(), STATE_DIM);
        assert_eq!(v[0], 1.0);
        assert_eq!(v[4], 5.0);
        assert_eq!(v[6], 1.0); // identity quaternion w
        assert_eq!(v[22], 0.7);
    }

    #[test]
    fn test_initial_covariance_well_formed() {
        let p = initial_covariance(1e-2);
        assert!(covariance_is_well_formed(&p));
        assert_relative_eq!(position_block_variance(&p), 1e-2);
    }

    #[test]
    fn test_asymmetric_covariance_rejected() {
        let mut p = initial_covariance(1e-2);
        p[(0, 1)] = 0.5;
        assert!(!covariance_is_well_formed(&p));
    }
}

//! Ground-truth motion oracle.
//!
//! Maintains the true kinematic state of the simulated platform and
//! generates noisy sensor streams from it. All noise comes from a seeded
//! ChaCha RNG, so a run is fully reproducible from its seed.

use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use relnav_core::constants::SEA_LEVEL_PRESSURE_HPA;
use relnav_core::SensorSample;

/// True motion of the simulated platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionProfile {
    /// Platform at rest; only sensor noise reaches the pipeline
    Stationary,

    /// Constant body acceleration (m/s², east/north/up)
    ConstantAccel(Vector3<f64>),

    /// Constant-speed cruise heading east with a steady climb (m/s)
    Cruise { speed_m_s: f64, climb_m_s: f64 },
}

impl MotionProfile {
    /// True acceleration at elapsed time `t_s`.
    fn acceleration(&self, _t_s: f64) -> Vector3<f64> {
        match *self {
            Self::Stationary | Self::Cruise { .. } => Vector3::zeros(),
            Self::ConstantAccel(a) => a,
        }
    }

    /// Initial true velocity.
    fn initial_velocity(&self) -> Vector3<f64> {
        match *self {
            Self::Stationary | Self::ConstantAccel(_) => Vector3::zeros(),
            Self::Cruise { speed_m_s, climb_m_s } => Vector3::new(speed_m_s, 0.0, climb_m_s),
        }
    }
}

/// Sensor noise levels (standard deviations).
#[derive(Debug, Clone)]
pub struct NoiseModel {
    pub accel_m_s2: f64,
    pub gyro_rad_s: f64,
    pub gps_m: f64,
    pub baro_h_pa: f64,
}

impl Default for NoiseModel {
    fn default() -> Self {
        Self {
            accel_m_s2: 0.002, // below the dead-zone threshold
            gyro_rad_s: 0.001,
            gps_m: 2.0,
            // Post-filter RMS of a modern baro; raw pressure noise would
            // dominate the differentiated vertical rate.
            baro_h_pa: 0.01,
        }
    }
}

/// The generated per-source streams for one session.
#[derive(Debug, Clone, Default)]
pub struct SensorTrace {
    /// Interleaved accelerometer and gyroscope samples, time-ordered
    pub imu: Vec<SensorSample>,

    /// Positional fixes
    pub gps: Vec<SensorSample>,

    /// Barometric samples
    pub baro: Vec<SensorSample>,

    /// Ambient illuminance/sound samples
    pub ambient: Vec<SensorSample>,
}

impl SensorTrace {
    /// Total number of samples across all sources.
    pub fn len(&self) -> usize {
        self.imu.len() + self.gps.len() + self.baro.len() + self.ambient.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Generation cadences for each source.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    pub duration_s: f64,
    pub imu_rate_hz: f64,
    pub gps_period_s: f64,
    pub baro_period_s: f64,
    pub ambient_period_s: f64,

    /// Seed latitude/longitude/altitude for converting true displacement
    /// into geodetic fixes
    pub origin: Vector3<f64>,

    /// Fraction of GPS fixes to drop, for dropout scenarios
    pub gps_dropout: f64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            duration_s: 10.0,
            imu_rate_hz: 100.0,
            gps_period_s: 1.0,
            baro_period_s: 0.2,
            ambient_period_s: 2.0,
            origin: Vector3::new(43.3, 5.4, 10.0),
            gps_dropout: 0.0,
        }
    }
}

/// Generates reproducible sensor traces from a motion profile.
pub struct MotionOracle {
    rng: ChaCha8Rng,
    noise: NoiseModel,
}

impl MotionOracle {
    /// Creates an oracle with the given physics seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            noise: NoiseModel::default(),
        }
    }

    pub fn with_noise(seed: u64, noise: NoiseModel) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            noise,
        }
    }

    /// Generates the full session trace.
    pub fn generate(&mut self, profile: &MotionProfile, config: &TraceConfig) -> SensorTrace {
        let mut trace = SensorTrace::default();

        let accel_noise = Normal::new(0.0, self.noise.accel_m_s2).unwrap();
        let gyro_noise = Normal::new(0.0, self.noise.gyro_rad_s).unwrap();
        let gps_noise = Normal::new(0.0, self.noise.gps_m).unwrap();
        let baro_noise = Normal::new(0.0, self.noise.baro_h_pa).unwrap();

        // IMU stream: accelerometer and gyroscope at the full rate.
        let imu_dt = 1.0 / config.imu_rate_hz;
        let imu_ticks = (config.duration_s / imu_dt) as usize;
        for i in 1..=imu_ticks {
            let t_s = i as f64 * imu_dt;
            let a = profile.acceleration(t_s);
            trace.imu.push(SensorSample::Accelerometer {
                x: a.x + accel_noise.sample(&mut self.rng),
                y: a.y + accel_noise.sample(&mut self.rng),
                z: a.z + accel_noise.sample(&mut self.rng),
                t_ms: t_s * 1000.0,
            });
            trace.imu.push(SensorSample::Gyroscope {
                x: gyro_noise.sample(&mut self.rng),
                y: gyro_noise.sample(&mut self.rng),
                z: gyro_noise.sample(&mut self.rng),
                t_ms: t_s * 1000.0,
            });
        }

        // GPS stream: fixes from true displacement, meters converted to
        // geodetic offsets around the origin.
        let mut v = profile.initial_velocity();
        let mut displacement = Vector3::zeros();
        let gps_ticks = (config.duration_s / config.gps_period_s) as usize;
        let mut sim_t = 0.0;
        let fine_dt = imu_dt;
        let mut next_fix = config.gps_period_s;
        let mut fix_idx = 0usize;
        let total_steps = (config.duration_s / fine_dt) as usize;
        for _ in 0..total_steps {
            v += profile.acceleration(sim_t) * fine_dt;
            displacement += v * fine_dt;
            sim_t += fine_dt;
            if sim_t + 1e-9 >= next_fix && fix_idx < gps_ticks {
                next_fix += config.gps_period_s;
                fix_idx += 1;
                if self.drop_fix(config.gps_dropout) {
                    continue;
                }
                let east = displacement.x + gps_noise.sample(&mut self.rng);
                let north = displacement.y + gps_noise.sample(&mut self.rng);
                let up = displacement.z + gps_noise.sample(&mut self.rng) * 0.5;
                trace.gps.push(geodetic_fix(config.origin, east, north, up, sim_t * 1000.0));
            }
        }

        // Barometer stream: pressure from true altitude.
        let baro_ticks = (config.duration_s / config.baro_period_s) as usize;
        let mut bv = profile.initial_velocity();
        let mut alt = config.origin.z;
        for i in 1..=baro_ticks {
            let t_s = i as f64 * config.baro_period_s;
            bv += profile.acceleration(t_s) * config.baro_period_s;
            alt += bv.z * config.baro_period_s;
            trace.baro.push(SensorSample::Barometer {
                h_pa: pressure_at_altitude(alt) + baro_noise.sample(&mut self.rng),
                t_ms: t_s * 1000.0,
            });
        }

        // Ambient stream: slowly varying illuminance and sound level.
        let ambient_ticks = (config.duration_s / config.ambient_period_s) as usize;
        for i in 1..=ambient_ticks {
            let t_s = i as f64 * config.ambient_period_s;
            trace.ambient.push(SensorSample::Ambient {
                lux: 400.0 + 50.0 * (t_s * 0.1).sin(),
                db: 45.0 + 5.0 * (t_s * 0.3).cos(),
                t_ms: t_s * 1000.0,
            });
        }

        trace
    }

    fn drop_fix(&mut self, dropout: f64) -> bool {
        if dropout <= 0.0 {
            return false;
        }
        let u: f64 = rand::Rng::gen(&mut self.rng);
        u < dropout
    }
}

/// Converts a local east/north/up displacement into a geodetic fix.
fn geodetic_fix(origin: Vector3<f64>, east: f64, north: f64, up: f64, t_ms: f64) -> SensorSample {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let lat = origin.x + (north / EARTH_RADIUS_M).to_degrees();
    let lon = origin.y
        + (east / (EARTH_RADIUS_M * origin.x.to_radians().cos())).to_degrees();
    SensorSample::GpsFix {
        lat,
        lon,
        alt: origin.z + up,
        t_ms,
    }
}

/// Inverse of the hypsometric relation: pressure at a given altitude.
fn pressure_at_altitude(alt_m: f64) -> f64 {
    SEA_LEVEL_PRESSURE_HPA * (1.0 - alt_m / 44_330.0).powf(5.255)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_is_deterministic_per_seed() {
        let config = TraceConfig {
            duration_s: 2.0,
            ..Default::default()
        };
        let profile = MotionProfile::ConstantAccel(Vector3::new(1.0, 0.0, 0.0));

        let t1 = MotionOracle::new(42).generate(&profile, &config);
        let t2 = MotionOracle::new(42).generate(&profile, &config);
        let t3 = MotionOracle::new(43).generate(&profile, &config);

        assert_eq!(t1.imu, t2.imu);
        assert_eq!(t1.gps, t2.gps);
        assert_ne!(t1.imu, t3.imu);
    }

    #[test]
    fn test_trace_cadences() {
        let config = TraceConfig {
            duration_s: 5.0,
            imu_rate_hz: 100.0,
            gps_period_s: 1.0,
            baro_period_s: 0.5,
            ..Default::default()
        };
        let trace = MotionOracle::new(7).generate(&MotionProfile::Stationary, &config);

        // Accel + gyro per IMU tick.
        assert_eq!(trace.imu.len(), 1000);
        assert_eq!(trace.gps.len(), 5);
        assert_eq!(trace.baro.len(), 10);
    }

    #[test]
    fn test_gps_dropout_thins_fixes() {
        let config = TraceConfig {
            duration_s: 30.0,
            gps_dropout: 1.0,
            ..Default::default()
        };
        let trace = MotionOracle::new(7).generate(&MotionProfile::Stationary, &config);
        assert!(trace.gps.is_empty());
    }

    #[test]
    fn test_pressure_altitude_inverse() {
        let p = pressure_at_altitude(0.0);
        assert!((p - SEA_LEVEL_PRESSURE_HPA).abs() < 1e-9);
        assert!(pressure_at_altitude(1000.0) < p);
    }

    #[test]
    fn test_timestamps_monotonic_per_source() {
        let config = TraceConfig::default();
        let trace = MotionOracle::new(1).generate(
            &MotionProfile::Cruise { speed_m_s: 30.0, climb_m_s: 1.0 },
            &config,
        );

        for pair in trace.gps.windows(2) {
            assert!(pair[0].timestamp_ms() <= pair[1].timestamp_ms());
        }
        for pair in trace.baro.windows(2) {
            assert!(pair[0].timestamp_ms() <= pair[1].timestamp_ms());
        }
    }
}

//! Ephemeris collaborator: celestial context for telemetry display.
//!
//! Consumers use this only to enrich display output and to correct the
//! nominal speed-of-sound constant. An unavailable provider is never fatal;
//! the built-in [`NominalEphemeris`] uses standard low-precision formulae
//! and is always available.

use serde::{Deserialize, Serialize};

use crate::error::EnvError;

/// Output of one celestial computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CelestialSnapshot {
    /// Sun altitude above the horizon (deg)
    pub sun_altitude_deg: f64,

    /// Sun azimuth, measured from north through east (deg)
    pub sun_azimuth_deg: f64,

    /// Local apparent sidereal time (hours)
    pub local_sidereal_time_h: f64,

    /// Temperature-corrected local speed of sound (m/s)
    pub local_sound_speed_m_s: f64,

    /// Julian date
    pub julian_date: f64,
}

/// Computes celestial context for a time and place.
pub trait EphemerisProvider: Send + Sync {
    /// Computes the celestial snapshot for the given observer.
    ///
    /// `timestamp_ms` is corrected wall-clock milliseconds since the epoch.
    fn compute_celestial(
        &self,
        timestamp_ms: f64,
        latitude_deg: f64,
        longitude_deg: f64,
        temperature_c: f64,
        pressure_hpa: f64,
    ) -> Result<CelestialSnapshot, EnvError>;
}

/// Built-in provider using low-precision solar position formulae
/// (Astronomical Almanac approximation, good to ~0.01°).
pub struct NominalEphemeris;

impl EphemerisProvider for NominalEphemeris {
    fn compute_celestial(
        &self,
        timestamp_ms: f64,
        latitude_deg: f64,
        longitude_deg: f64,
        temperature_c: f64,
        _pressure_hpa: f64,
    ) -> Result<CelestialSnapshot, EnvError> {
        if !timestamp_ms.is_finite() || !latitude_deg.is_finite() || !longitude_deg.is_finite() {
            return Err(EnvError::ephemeris("non-finite observer input"));
        }

        let jd = julian_date(timestamp_ms);
        let n = jd - 2_451_545.0; // days since J2000.0

        // Solar ecliptic longitude from mean longitude and mean anomaly.
        let mean_long = normalize_deg(280.460 + 0.985_647_4 * n);
        let mean_anom = normalize_deg(357.528 + 0.985_600_3 * n).to_radians();
        let ecliptic_long = (mean_long
            + 1.915 * mean_anom.sin()
            + 0.020 * (2.0 * mean_anom).sin())
        .to_radians();

        let obliquity = (23.439 - 4.0e-7 * n).to_radians();
        let ra = (obliquity.cos() * ecliptic_long.sin()).atan2(ecliptic_long.cos());
        let dec = (obliquity.sin() * ecliptic_long.sin()).asin();

        // Greenwich mean sidereal time, then local.
        let gmst_h = (18.697_374_558 + 24.065_709_824_419_08 * n).rem_euclid(24.0);
        let lst_h = (gmst_h + longitude_deg / 15.0).rem_euclid(24.0);

        let hour_angle = (lst_h * 15.0).to_radians() - ra;
        let lat = latitude_deg.to_radians();

        let sin_alt = dec.sin() * lat.sin() + dec.cos() * lat.cos() * hour_angle.cos();
        let altitude = sin_alt.asin();
        let azimuth = (-dec.cos() * hour_angle.sin())
            .atan2(dec.sin() * lat.cos() - dec.cos() * lat.sin() * hour_angle.cos());

        Ok(CelestialSnapshot {
            sun_altitude_deg: altitude.to_degrees(),
            sun_azimuth_deg: azimuth.to_degrees().rem_euclid(360.0),
            local_sidereal_time_h: lst_h,
            local_sound_speed_m_s: sound_speed_m_s(temperature_c),
            julian_date: jd,
        })
    }
}

/// Julian date from unix milliseconds.
pub fn julian_date(timestamp_ms: f64) -> f64 {
    timestamp_ms / 86_400_000.0 + 2_440_587.5
}

/// Speed of sound in air at the given temperature, c = 331.3 + 0.606·T.
pub fn sound_speed_m_s(temperature_c: f64) -> f64 {
    331.3 + 0.606 * temperature_c
}

fn normalize_deg(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_julian_date_epoch() {
        // Unix epoch is JD 2440587.5 by definition.
        assert_relative_eq!(julian_date(0.0), 2_440_587.5, epsilon = 1e-9);
    }

    #[test]
    fn test_sound_speed_at_20c() {
        assert_relative_eq!(sound_speed_m_s(20.0), 343.42, epsilon = 1e-9);
        assert_relative_eq!(sound_speed_m_s(0.0), 331.3, epsilon = 1e-9);
    }

    #[test]
    fn test_snapshot_fields_in_range() {
        let eph = NominalEphemeris;
        // 2024-03-20 12:00 UTC, roughly the March equinox.
        let snap = eph
            .compute_celestial(1_710_936_000_000.0, 0.0, 0.0, 15.0, 1013.25)
            .unwrap();

        assert!(snap.sun_altitude_deg > -90.0 && snap.sun_altitude_deg < 90.0);
        assert!(snap.sun_azimuth_deg >= 0.0 && snap.sun_azimuth_deg < 360.0);
        assert!(snap.local_sidereal_time_h >= 0.0 && snap.local_sidereal_time_h < 24.0);

        // Near noon at the equator on the equinox the sun is close to zenith.
        assert!(snap.sun_altitude_deg > 60.0);
    }

    #[test]
    fn test_non_finite_input_degrades() {
        let eph = NominalEphemeris;
        let result = eph.compute_celestial(f64::NAN, 0.0, 0.0, 15.0, 1013.25);
        assert!(matches!(result, Err(EnvError::EphemerisUnavailable(_))));
    }
}

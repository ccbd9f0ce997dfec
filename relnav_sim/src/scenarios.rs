//! Named simulation scenarios.

use nalgebra::Vector3;

use crate::oracle::{MotionProfile, TraceConfig};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Platform at rest; exercises dead-zoning and drift suppression
    Stationary,

    /// Constant 1 m/s² eastward acceleration for the full session
    ConstantAccel,

    /// Steady 30 m/s cruise with a 1 m/s climb, GPS and barometer active
    Cruise,

    /// Cruise with 60% of GPS fixes dropped; inertial dead reckoning
    FixDropout,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Stationary,
            ScenarioId::ConstantAccel,
            ScenarioId::Cruise,
            ScenarioId::FixDropout,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Stationary => "stationary",
            ScenarioId::ConstantAccel => "constant_accel",
            ScenarioId::Cruise => "cruise",
            ScenarioId::FixDropout => "fix_dropout",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Stationary => "platform at rest, noise-only sensor streams",
            ScenarioId::ConstantAccel => "1 m/s² constant acceleration, full sensor suite",
            ScenarioId::Cruise => "30 m/s cruise with climb, GPS + barometer corrections",
            ScenarioId::FixDropout => "cruise with 60% GPS dropout, dead-reckoning stress",
        }
    }

    /// Ground-truth motion for this scenario.
    pub fn motion_profile(&self) -> MotionProfile {
        match self {
            ScenarioId::Stationary => MotionProfile::Stationary,
            ScenarioId::ConstantAccel => {
                MotionProfile::ConstantAccel(Vector3::new(1.0, 0.0, 0.0))
            }
            ScenarioId::Cruise | ScenarioId::FixDropout => MotionProfile::Cruise {
                speed_m_s: 30.0,
                climb_m_s: 1.0,
            },
        }
    }

    /// Trace cadences and dropout for this scenario.
    pub fn trace_config(&self, duration_s: f64) -> TraceConfig {
        let gps_dropout = match self {
            ScenarioId::FixDropout => 0.6,
            _ => 0.0,
        };
        TraceConfig {
            duration_s,
            gps_dropout,
            ..Default::default()
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stationary" => Ok(ScenarioId::Stationary),
            "constant_accel" | "constantaccel" => Ok(ScenarioId::ConstantAccel),
            "cruise" => Ok(ScenarioId::Cruise),
            "fix_dropout" | "fixdropout" => Ok(ScenarioId::FixDropout),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

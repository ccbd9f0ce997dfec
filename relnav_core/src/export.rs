//! Session export document.
//!
//! A self-describing JSON artifact consumed by the persistence collaborator:
//! session identifier, the ordered event log, and the final computed maxima.
//! Reloading the document reproduces every scalar field to serialization
//! precision.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::{NavigationState, STATE_LAYOUT_VERSION};
use crate::telemetry::StateView;

/// One motion event recorded during the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    /// Wallclock timestamp (ms)
    pub timestamp_ms: f64,

    /// Acceleration magnitude at the event (m/s²)
    pub magnitude: f64,

    /// Jerk at the event (g/s)
    pub jerk_g_s: f64,

    /// Ground speed at the event (m/s)
    pub speed_m_s: f64,
}

/// The full-session artifact handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExport {
    /// Unique session identifier
    pub session_id: Uuid,

    /// Version of the state layout the final state was flattened from
    pub state_layout_version: u32,

    /// Ordered event log, oldest first
    pub events: Vec<EventLogEntry>,

    /// Final navigation state at session end
    pub final_state: StateView,

    /// Session maxima and totals
    pub peak_g_force: f64,
    pub distance_m: f64,
    pub proper_time_s: f64,
    pub elapsed_s: f64,
}

impl SessionExport {
    /// Creates an empty export for a new session.
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state_layout_version: STATE_LAYOUT_VERSION,
            events: Vec::new(),
            final_state: StateView {
                position: [0.0; 3],
                velocity: [0.0; 3],
                orientation: [1.0, 0.0, 0.0, 0.0],
            },
            peak_g_force: 0.0,
            distance_m: 0.0,
            proper_time_s: 0.0,
            elapsed_s: 0.0,
        }
    }

    /// Appends one event to the log.
    pub fn push_event(&mut self, entry: EventLogEntry) {
        self.events.push(entry);
    }

    /// Records the final state and session totals.
    pub fn finalize(
        &mut self,
        state: &NavigationState,
        peak_g_force: f64,
        distance_m: f64,
        proper_time_s: f64,
        elapsed_s: f64,
    ) {
        self.final_state = StateView::from_state(state);
        self.peak_g_force = peak_g_force;
        self.distance_m = distance_m;
        self.proper_time_s = proper_time_s;
        self.elapsed_s = elapsed_s;
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Reconstructs an export from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Writes the document to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())
    }

    /// Loads a document from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut json = String::new();
        File::open(path)?.read_to_string(&mut json)?;
        Self::from_json(&json).map_err(std::io::Error::other)
    }
}

impl Default for SessionExport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn sample_export() -> SessionExport {
        let mut export = SessionExport::new();
        export.push_event(EventLogEntry {
            timestamp_ms: 100.0,
            magnitude: 2.5,
            jerk_g_s: 0.3,
            speed_m_s: 4.2,
        });
        export.push_event(EventLogEntry {
            timestamp_ms: 250.0,
            magnitude: 9.1,
            jerk_g_s: -1.7,
            speed_m_s: 6.0,
        });

        let mut state = NavigationState::seeded(43.3, 5.4, 10.0);
        state.velocity = Vector3::new(1.0, 2.0, 3.0);
        export.finalize(&state, 1.93, 123.456, 59.999_999, 60.0);
        export
    }

    #[test]
    fn test_json_round_trip_is_exact() {
        let export = sample_export();
        let json = export.to_json().unwrap();
        let reloaded = SessionExport::from_json(&json).unwrap();

        assert_eq!(reloaded, export);
        assert_eq!(reloaded.session_id, export.session_id);
        assert_eq!(reloaded.events.len(), 2);
        assert_eq!(reloaded.peak_g_force, 1.93);
        assert_eq!(reloaded.proper_time_s, 59.999_999);
    }

    #[test]
    fn test_event_order_preserved() {
        let export = sample_export();
        let json = export.to_json().unwrap();
        let reloaded = SessionExport::from_json(&json).unwrap();

        assert!(reloaded.events[0].timestamp_ms < reloaded.events[1].timestamp_ms);
    }

    #[test]
    fn test_layout_version_recorded() {
        let export = SessionExport::new();
        assert_eq!(export.state_layout_version, STATE_LAYOUT_VERSION);
    }
}

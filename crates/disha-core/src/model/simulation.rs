// ── Traffic simulation parameters ──

use serde::{Deserialize, Serialize};

use super::signal::SignalState;

/// A synthetic traffic observation pushed to one road's signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSimulation {
    pub road_id: String,
    /// Congestion, 0–100.
    pub density: u8,
    /// Average speed in km/h.
    pub avg_speed: f64,
    pub emergency_vehicle: bool,
}

impl TrafficSimulation {
    pub fn new(road_id: impl Into<String>, density: u8, avg_speed: f64) -> Self {
        Self {
            road_id: road_id.into(),
            density: density.min(100),
            avg_speed,
            emergency_vehicle: false,
        }
    }

    pub fn with_emergency_vehicle(mut self, detected: bool) -> Self {
        self.emergency_vehicle = detected;
        self
    }
}

/// The backend's echo of a simulation request. Every field is optional;
/// callers are free to ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub signal_id: Option<String>,
    pub new_state: Option<SignalState>,
    pub density: Option<u8>,
}

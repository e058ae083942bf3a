// ── Traffic signal domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::incident::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[non_exhaustive]
pub enum SignalState {
    Green,
    Yellow,
    Red,
    Unknown,
}

impl SignalState {
    pub fn from_wire(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Unknown)
    }
}

/// A traffic signal and its latest observed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub location_name: String,
    /// Congestion, 0–100.
    pub density: u8,
    pub state: SignalState,
    pub position: Option<GeoPoint>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Signal {
    /// Density above which the dashboard treats a junction as congested.
    pub const CONGESTED: u8 = 70;

    pub fn is_congested(&self) -> bool {
        self.density > Self::CONGESTED
    }
}

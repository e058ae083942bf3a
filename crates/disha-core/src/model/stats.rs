use serde::{Deserialize, Serialize};

/// Aggregate incident counters. Only the latest snapshot is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_incidents: u64,
    pub active_incidents: u64,
    pub high_severity_count: u64,
}

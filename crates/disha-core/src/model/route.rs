use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Routing advice computed by the backend for one incident.
///
/// Ephemeral: owned by the inspection session and dropped on dismissal or
/// when another incident is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSuggestion {
    pub incident_id: String,
    pub ai_message: String,
    pub safe_route: String,
    pub eco_route: String,
    pub fastest_route: String,
    pub generated_at: Option<DateTime<Utc>>,
}

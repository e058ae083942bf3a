//! Wire types for the Disha backend API.
//!
//! Field names match the JSON exactly (snake_case). Enumerated values
//! (incident type, severity, signal state) are kept as raw strings here;
//! `disha-core` normalizes them into domain enums.

use serde::{Deserialize, Serialize};

// ── Incidents ────────────────────────────────────────────────────────

/// Incident record from `GET /incidents` and `POST /incidents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentResponse {
    pub id: String,
    /// One of: `traffic_jam`, `accident`, `road_work`, `emergency`.
    #[serde(rename = "type")]
    pub incident_type: String,
    /// One of: `low`, `medium`, `high`.
    pub severity: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub reporter_name: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    /// ISO 8601 date-time assigned by the backend.
    #[serde(default)]
    pub timestamp: Option<String>,
}

fn default_status() -> String {
    "active".into()
}

/// Body for `POST /incidents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentCreateRequest {
    #[serde(rename = "type")]
    pub incident_type: String,
    pub severity: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,
}

// ── Route analysis ───────────────────────────────────────────────────

/// AI route analysis from `GET /incidents/{id}/routes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAnalysisResponse {
    #[serde(default)]
    pub incident_id: Option<String>,
    pub ai_message: String,
    pub safe_route: String,
    pub eco_route: String,
    pub fastest_route: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

// ── Traffic signals ──────────────────────────────────────────────────

/// Traffic signal from `GET /signals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResponse {
    pub signal_id: String,
    pub location: String,
    /// Percentage, 0–100.
    pub traffic_density: i64,
    /// One of: `GREEN`, `YELLOW`, `RED`.
    pub current_state: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Acknowledgement from `POST /signals/initialize`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InitializeSignalsResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
}

// ── Stats ────────────────────────────────────────────────────────────

/// Aggregate counters from `GET /stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_incidents: u64,
    pub active_incidents: u64,
    pub high_severity_count: u64,
}

// ── Simulation ───────────────────────────────────────────────────────

/// Body for `POST /simulate/traffic`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSimulationRequest {
    pub road_id: String,
    pub traffic_density: u8,
    pub avg_speed: f64,
    pub emergency_vehicle_detected: bool,
}

/// Echo from `POST /simulate/traffic`. The backend is not required to
/// send a body, so every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationResponse {
    #[serde(default)]
    pub signal_id: Option<String>,
    #[serde(default)]
    pub new_state: Option<String>,
    #[serde(default)]
    pub density: Option<i64>,
}

// ── System ───────────────────────────────────────────────────────────

/// Backend banner from `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfoResponse {
    pub message: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// FastAPI-style error body: `{"detail": "..."}` or `{"detail": [...]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Flatten `detail` into a readable message.
    pub(crate) fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| {
                        item.get("msg")
                            .and_then(serde_json::Value::as_str)
                            .map_or_else(|| item.to_string(), String::from)
                    })
                    .collect();
                Some(parts.join("; "))
            }
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn incident_uses_type_key_and_defaults_status() {
        let raw = json!({
            "id": "inc-1",
            "type": "accident",
            "severity": "high",
            "description": "multi-car collision",
            "lat": 12.97,
            "lng": 77.59
        });
        let incident: IncidentResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(incident.incident_type, "accident");
        assert_eq!(incident.status, "active");
        assert!(incident.reporter_name.is_none());
        assert!(incident.timestamp.is_none());
    }

    #[test]
    fn create_request_omits_absent_optionals() {
        let req = IncidentCreateRequest {
            incident_type: "road_work".into(),
            severity: "low".into(),
            description: "lane closed".into(),
            lat: 12.9,
            lng: 77.6,
            photo_url: None,
            reporter_name: Some("Asha".into()),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["type"], "road_work");
        assert_eq!(value["reporter_name"], "Asha");
        assert!(value.get("photo_url").is_none());
    }

    #[test]
    fn error_detail_string_and_list() {
        let plain: ErrorResponse =
            serde_json::from_value(json!({"detail": "Incident not found"})).unwrap();
        assert_eq!(plain.message().as_deref(), Some("Incident not found"));

        let list: ErrorResponse = serde_json::from_value(json!({
            "detail": [
                {"loc": ["body", "lat"], "msg": "field required"},
                {"loc": ["body", "lng"], "msg": "field required"}
            ]
        }))
        .unwrap();
        assert_eq!(
            list.message().as_deref(),
            Some("field required; field required")
        );

        let empty: ErrorResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.message().is_none());
    }
}

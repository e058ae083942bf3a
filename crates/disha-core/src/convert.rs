// ── API-to-domain type conversions ──
//
// Bridges raw `disha_api` wire types into canonical `disha_core::model`
// domain types and back. Enumerated strings become enums (unknown values
// survive as `Unknown`), timestamps become `DateTime<Utc>`, and out-of-range
// numbers are clamped rather than rejected.

use chrono::{DateTime, NaiveDateTime, Utc};

use disha_api::models::{
    IncidentCreateRequest, IncidentResponse, RouteAnalysisResponse, SignalResponse,
    SimulationResponse, StatsResponse, TrafficSimulationRequest,
};

use crate::model::{
    GeoPoint, Incident, IncidentDraft, IncidentKind, RouteSuggestion, Severity, Signal,
    SignalState, SimulationOutcome, Stats, TrafficSimulation,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 and the naive ISO form Python's `datetime.isoformat()`
/// emits for UTC values (no offset), which is treated as UTC.
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn clamp_density(raw: i64) -> u8 {
    u8::try_from(raw.clamp(0, 100)).unwrap_or(100)
}

// ── Incidents ──────────────────────────────────────────────────────

impl From<IncidentResponse> for Incident {
    fn from(raw: IncidentResponse) -> Self {
        Self {
            kind: IncidentKind::from_wire(&raw.incident_type),
            severity: Severity::from_wire(&raw.severity),
            location: GeoPoint::new(raw.lat, raw.lng),
            reported_at: parse_timestamp(raw.timestamp.as_deref()),
            id: raw.id,
            description: raw.description,
            reporter_name: raw.reporter_name,
            photo_url: raw.photo_url,
            status: raw.status,
        }
    }
}

impl From<&IncidentDraft> for IncidentCreateRequest {
    fn from(draft: &IncidentDraft) -> Self {
        Self {
            incident_type: draft.kind.to_string(),
            severity: draft.severity.to_string(),
            description: draft.description.trim().to_owned(),
            lat: draft.location.lat,
            lng: draft.location.lng,
            photo_url: draft.photo_url.clone(),
            reporter_name: draft.reporter_name.clone(),
        }
    }
}

// ── Route suggestions ──────────────────────────────────────────────

/// The backend may omit `incident_id`; fall back to the id that was asked for.
pub(crate) fn route_suggestion(raw: RouteAnalysisResponse, requested_id: &str) -> RouteSuggestion {
    RouteSuggestion {
        incident_id: raw.incident_id.unwrap_or_else(|| requested_id.to_owned()),
        generated_at: parse_timestamp(raw.timestamp.as_deref()),
        ai_message: raw.ai_message,
        safe_route: raw.safe_route,
        eco_route: raw.eco_route,
        fastest_route: raw.fastest_route,
    }
}

// ── Signals ────────────────────────────────────────────────────────

impl From<SignalResponse> for Signal {
    fn from(raw: SignalResponse) -> Self {
        let position = match (raw.lat, raw.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        };
        Self {
            density: clamp_density(raw.traffic_density),
            state: SignalState::from_wire(&raw.current_state),
            last_updated: parse_timestamp(raw.last_updated.as_deref()),
            id: raw.signal_id,
            location_name: raw.location,
            position,
        }
    }
}

// ── Stats ──────────────────────────────────────────────────────────

impl From<StatsResponse> for Stats {
    fn from(raw: StatsResponse) -> Self {
        Self {
            total_incidents: raw.total_incidents,
            active_incidents: raw.active_incidents,
            high_severity_count: raw.high_severity_count,
        }
    }
}

// ── Simulation ─────────────────────────────────────────────────────

impl From<&TrafficSimulation> for TrafficSimulationRequest {
    fn from(sim: &TrafficSimulation) -> Self {
        Self {
            road_id: sim.road_id.clone(),
            traffic_density: sim.density.min(100),
            avg_speed: sim.avg_speed,
            emergency_vehicle_detected: sim.emergency_vehicle,
        }
    }
}

impl From<SimulationResponse> for SimulationOutcome {
    fn from(raw: SimulationResponse) -> Self {
        Self {
            signal_id: raw.signal_id,
            new_state: raw.new_state.as_deref().map(SignalState::from_wire),
            density: raw.density.map(clamp_density),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;

    use super::*;

    fn incident_response(kind: &str, severity: &str) -> IncidentResponse {
        IncidentResponse {
            id: "inc-1".into(),
            incident_type: kind.into(),
            severity: severity.into(),
            description: "Lorry breakdown".into(),
            lat: 12.93,
            lng: 77.62,
            photo_url: None,
            reporter_name: Some("Asha".into()),
            status: "active".into(),
            timestamp: Some("2025-01-15T08:30:00.123456".into()),
        }
    }

    #[test]
    fn incident_maps_known_values() {
        let incident = Incident::from(incident_response("accident", "high"));
        assert_eq!(incident.kind, IncidentKind::Accident);
        assert_eq!(incident.severity, Severity::High);
        assert_eq!(incident.location, GeoPoint::new(12.93, 77.62));
        assert!(incident.is_active());
        let at = incident.reported_at.unwrap();
        assert_eq!((at.year(), at.hour(), at.minute()), (2025, 8, 30));
    }

    #[test]
    fn incident_tolerates_unknown_values() {
        let incident = Incident::from(incident_response("flood", "extreme"));
        assert_eq!(incident.kind, IncidentKind::Unknown);
        assert_eq!(incident.severity, Severity::Unknown);
    }

    #[test]
    fn timestamps_accept_offsets_and_reject_garbage() {
        assert!(parse_timestamp(Some("2025-01-15T08:30:00+05:30")).is_some());
        assert!(parse_timestamp(Some("2025-01-15T08:30:00")).is_some());
        assert!(parse_timestamp(Some("yesterday")).is_none());
        assert!(parse_timestamp(None).is_none());
    }

    #[test]
    fn signal_density_is_clamped() {
        let signal = Signal::from(SignalResponse {
            signal_id: "SILK_BOARD".into(),
            location: "Silk Board Junction".into(),
            traffic_density: 140,
            current_state: "RED".into(),
            lat: Some(12.9177),
            lng: None,
            last_updated: None,
        });
        assert_eq!(signal.density, 100);
        assert_eq!(signal.state, SignalState::Red);
        assert!(signal.position.is_none());
    }

    #[test]
    fn route_falls_back_to_requested_id() {
        let route = route_suggestion(
            RouteAnalysisResponse {
                incident_id: None,
                ai_message: "Avoid the flyover".into(),
                safe_route: "Via Koramangala".into(),
                eco_route: "Via HSR".into(),
                fastest_route: "Via ORR".into(),
                timestamp: None,
            },
            "inc-9",
        );
        assert_eq!(route.incident_id, "inc-9");
    }

    #[test]
    fn draft_trims_description_on_the_wire() {
        let draft = IncidentDraft::new(
            IncidentKind::RoadWork,
            Severity::Low,
            "  Metro work  ",
            GeoPoint::BANGALORE,
        )
        .with_reporter("Ravi");
        let req = IncidentCreateRequest::from(&draft);
        assert_eq!(req.incident_type, "road_work");
        assert_eq!(req.severity, "low");
        assert_eq!(req.description, "Metro work");
        assert_eq!(req.reporter_name.as_deref(), Some("Ravi"));
    }
}

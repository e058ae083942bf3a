#![allow(clippy::unwrap_used)]
// End-to-end tests for `LiveView` over HTTP, against a wiremock backend.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use disha_core::{
    GeoPoint, IncidentDraft, IncidentKind, InspectionState, LiveView, RefreshOutcome,
    SelectOutcome, Severity, SignalState, ViewConfig,
};

fn incident_json(id: &str, description: &str) -> serde_json::Value {
    json!({
        "id": id,
        "type": "accident",
        "severity": "high",
        "description": description,
        "lat": 12.9352,
        "lng": 77.6245,
        "photo_url": null,
        "reporter_name": "Kiran",
        "status": "active",
        "timestamp": "2025-03-01T08:15:00.123456"
    })
}

fn stats_json(total: u64, high: u64) -> serde_json::Value {
    json!({ "total_incidents": total, "active_incidents": total, "high_severity_count": high })
}

async fn backend() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/signals/initialize"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "Signals initialized", "count": 5 })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/signals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "signal_id": "SILK_BOARD", "location": "Silk Board Junction",
              "traffic_density": 82, "current_state": "RED",
              "lat": 12.9177, "lng": 77.6238, "last_updated": "2025-03-01T08:15:00" },
            { "signal_id": "HEBBAL", "location": "Hebbal Flyover",
              "traffic_density": 35, "current_state": "GREEN" }
        ])))
        .mount(&server)
        .await;

    // Empty until the report lands, then the new incident.
    Mock::given(method("GET"))
        .and(path("/api/incidents"))
        .and(query_param("status", "active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/incidents"))
        .and(query_param("status", "active"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([incident_json("inc-1", "multi-car collision")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_json(0, 0)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_json(1, 1)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/incidents/inc-1/routes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "incident_id": "inc-1",
            "ai_message": "Avoid the Outer Ring Road near Bellandur.",
            "safe_route": "Sarjapur Road",
            "eco_route": "HSR Layout internal roads",
            "fastest_route": "Koramangala 80ft Road",
            "timestamp": "2025-03-01T08:16:00"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/incidents/missing/routes"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "Route analysis not found" })),
        )
        .mount(&server)
        .await;

    server
}

/// The create-incident endpoint, expected exactly once by the caller.
async fn mount_report(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/incidents"))
        .and(body_partial_json(json!({
            "type": "accident",
            "severity": "high",
            "description": "multi-car collision"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(incident_json("inc-1", "multi-car collision")),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn view_for(server: &MockServer) -> LiveView {
    let config = ViewConfig::new(Url::parse(&server.uri()).unwrap()).with_poll_interval(Duration::ZERO);
    LiveView::connect(config).unwrap()
}

#[tokio::test]
async fn reported_incident_reaches_the_cache_and_can_be_inspected() {
    let server = backend().await;
    mount_report(&server).await;
    let view = view_for(&server);

    let report = view.activate().await.unwrap();
    assert!(report.failures().is_empty(), "{report:?}");
    assert!(view.store().incidents_snapshot().is_empty());
    assert_eq!(view.store().signal_count(), 2);
    let silk = view.store().signal("SILK_BOARD").unwrap();
    assert_eq!((silk.density, silk.state), (82, SignalState::Red));
    assert!(silk.position.is_some());

    let draft = IncidentDraft::new(
        IncidentKind::Accident,
        Severity::High,
        "multi-car collision",
        GeoPoint::new(12.97, 77.59),
    )
    .with_reporter("Kiran");
    let incident = view.report_incident(&draft).await.unwrap();
    assert_eq!(incident.id, "inc-1");

    let cached = view.store().incident("inc-1").unwrap();
    assert_eq!(cached.description, "multi-car collision");
    assert_eq!(view.store().stats().high_severity_count, 1);

    let outcome = view.select_incident("inc-1").await.unwrap();
    let SelectOutcome::Loaded(route) = outcome else {
        panic!("expected Loaded, got {outcome:?}");
    };
    assert_eq!(route.safe_route, "Sarjapur Road");

    let report = view.tick().await;
    assert_eq!(report.incidents, RefreshOutcome::Skipped);
    assert_eq!(report.stats, RefreshOutcome::Skipped);
    assert_eq!(report.signals, RefreshOutcome::Applied);

    assert!(view.dismiss_route());
    assert_eq!(view.inspection(), InspectionState::Idle);
    let report = view.tick().await;
    assert_eq!(report.incidents, RefreshOutcome::Applied);
    assert_eq!(report.stats, RefreshOutcome::Applied);
    assert!(view.store().incident("inc-1").is_some());

    assert!(view.deactivate().await);
}

#[tokio::test]
async fn missing_route_analysis_is_not_found() {
    let server = backend().await;
    let view = view_for(&server);

    let err = view.select_incident("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Incident not found: missing");
    assert_eq!(view.inspection(), InspectionState::Idle);
}

#[tokio::test]
async fn unreachable_backend_fails_every_resource_independently() {
    let config = ViewConfig::new(Url::parse("http://127.0.0.1:1").unwrap())
        .with_poll_interval(Duration::ZERO);
    let view = LiveView::connect(config).unwrap();

    let report = view.activate().await.unwrap();
    assert_eq!(report.failures().len(), 3);
    assert!(view.store().last_refresh().is_none());
    view.deactivate().await;
}

// ── Simulation triggers and incident reporting ──
//
// User-initiated writes. Failures are logged and returned; they never touch
// the poll cycle or the inspection session. On success the affected caches
// are refreshed if the view is live.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::gateway::Gateway;
use crate::model::{
    GeoPoint, Incident, IncidentDraft, IncidentKind, Notice, RouteSuggestion, Severity,
    SimulationOutcome, TrafficSimulation,
};
use crate::store::Resource;
use crate::view::LiveView;

/// Half-width, in degrees, of the box random incidents land in.
pub const SCATTER_DEGREES: f64 = 0.05;

/// Reporter name attached to simulated incidents.
pub const SIMULATION_REPORTER: &str = "System";

/// A newly reported incident plus, if requested and available, its route
/// analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentReport {
    pub incident: Incident,
    pub routes: Option<RouteSuggestion>,
}

/// Draw a random incident near `home`.
pub fn random_draft<R: Rng + ?Sized>(rng: &mut R, home: GeoPoint) -> IncidentDraft {
    let kind = IncidentKind::SIMULATED
        .choose(rng)
        .copied()
        .unwrap_or(IncidentKind::TrafficJam);
    let severity = Severity::KNOWN.choose(rng).copied().unwrap_or(Severity::Medium);
    let location = GeoPoint::new(
        home.lat + rng.random_range(-SCATTER_DEGREES..SCATTER_DEGREES),
        home.lng + rng.random_range(-SCATTER_DEGREES..SCATTER_DEGREES),
    );
    IncidentDraft::new(
        kind,
        severity,
        format!("Simulated {kind} incident for testing"),
        location,
    )
    .with_reporter(SIMULATION_REPORTER)
}

impl<G: Gateway> LiveView<G> {
    // ── Simulations ──────────────────────────────────────────────────

    /// Simulate an emergency vehicle on the configured road.
    pub async fn simulate_emergency(&self) -> Result<SimulationOutcome, CoreError> {
        let profile = &self.inner.config.emergency;
        let params = TrafficSimulation::new(profile.road_id.clone(), profile.density, profile.avg_speed)
            .with_emergency_vehicle(true);
        let outcome = self.push_simulation(&params).await?;
        self.notify(Notice::success(
            "Emergency vehicle detected! Signals updated for green wave.",
        ));
        Ok(outcome)
    }

    /// Push an arbitrary traffic reading.
    pub async fn simulate_traffic(
        &self,
        params: &TrafficSimulation,
    ) -> Result<SimulationOutcome, CoreError> {
        let outcome = self.push_simulation(params).await?;
        self.notify(Notice::success(format!(
            "Traffic simulated on {}",
            params.road_id
        )));
        Ok(outcome)
    }

    async fn push_simulation(
        &self,
        params: &TrafficSimulation,
    ) -> Result<SimulationOutcome, CoreError> {
        let outcome = self
            .inner
            .gateway
            .simulate_traffic(params)
            .await
            .inspect_err(|e| warn!(road_id = %params.road_id, error = %e, "traffic simulation failed"))?;
        info!(
            road_id = %params.road_id,
            emergency = params.emergency_vehicle,
            new_state = ?outcome.new_state,
            "traffic simulated"
        );
        self.refresh_if_active(&[Resource::Signals]).await;
        Ok(outcome)
    }

    /// Create a random incident near the configured home position.
    pub async fn simulate_random_incident(&self) -> Result<Incident, CoreError> {
        let draft = random_draft(&mut rand::rng(), self.inner.config.home);
        let incident = self
            .inner
            .gateway
            .create_incident(&draft)
            .await
            .inspect_err(|e| warn!(error = %e, "random incident failed"))?;
        info!(id = %incident.id, kind = %incident.kind, "random incident created");
        self.refresh_if_active(&[Resource::Incidents, Resource::Stats])
            .await;
        self.notify(Notice::success("Random incident created successfully!"));
        Ok(incident)
    }

    // ── Reporting ────────────────────────────────────────────────────

    /// Validate and submit a user report.
    pub async fn report_incident(&self, draft: &IncidentDraft) -> Result<Incident, CoreError> {
        draft.validate()?;
        let incident = self
            .inner
            .gateway
            .create_incident(draft)
            .await
            .inspect_err(|e| warn!(error = %e, "incident report failed"))?;
        info!(id = %incident.id, kind = %incident.kind, "incident reported");
        self.refresh_if_active(&[Resource::Incidents, Resource::Stats])
            .await;
        self.notify(Notice::success(
            "Incident reported successfully! AI is analyzing routes...",
        ));
        Ok(incident)
    }

    /// Submit a report, wait for the backend's analysis, then fetch the
    /// route suggestions. A failed follow-up leaves `routes` empty.
    pub async fn report_and_analyze(&self, draft: &IncidentDraft) -> Result<IncidentReport, CoreError> {
        let incident = self.report_incident(draft).await?;
        tokio::time::sleep(self.inner.config.analysis_delay).await;

        let routes = match self.inner.gateway.get_route_suggestion(&incident.id).await {
            Ok(route) => Some(route),
            Err(e) => {
                warn!(id = %incident.id, error = %e, "route analysis unavailable");
                None
            }
        };
        Ok(IncidentReport { incident, routes })
    }
}

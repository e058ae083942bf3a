// ── Remote data gateway ──
//
// The seam between the live view and the backend. `DishaClient` is the
// production implementation; tests plug in a scripted one. Each call is a
// single request/response exchange: no retries, no caching.

use std::future::Future;

use disha_api::DishaClient;
use disha_api::models::{IncidentCreateRequest, TrafficSimulationRequest};
use tracing::debug;

use crate::convert::route_suggestion;
use crate::error::CoreError;
use crate::model::{
    Incident, IncidentDraft, RouteSuggestion, Signal, SimulationOutcome, Stats, TrafficSimulation,
};

/// Backend operations the live view depends on.
pub trait Gateway: Send + Sync + 'static {
    fn list_active_incidents(&self) -> impl Future<Output = Result<Vec<Incident>, CoreError>> + Send;

    fn create_incident(
        &self,
        draft: &IncidentDraft,
    ) -> impl Future<Output = Result<Incident, CoreError>> + Send;

    /// `NotFound` when the incident (or its analysis) is gone.
    fn get_route_suggestion(
        &self,
        incident_id: &str,
    ) -> impl Future<Output = Result<RouteSuggestion, CoreError>> + Send;

    fn list_signals(&self) -> impl Future<Output = Result<Vec<Signal>, CoreError>> + Send;

    fn get_stats(&self) -> impl Future<Output = Result<Stats, CoreError>> + Send;

    /// Idempotent on the backend side.
    fn initialize_signals(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn simulate_traffic(
        &self,
        params: &TrafficSimulation,
    ) -> impl Future<Output = Result<SimulationOutcome, CoreError>> + Send;
}

impl Gateway for DishaClient {
    async fn list_active_incidents(&self) -> Result<Vec<Incident>, CoreError> {
        let raw = DishaClient::list_active_incidents(self).await?;
        Ok(raw.into_iter().map(Incident::from).collect())
    }

    async fn create_incident(&self, draft: &IncidentDraft) -> Result<Incident, CoreError> {
        let body = IncidentCreateRequest::from(draft);
        Ok(DishaClient::create_incident(self, &body).await?.into())
    }

    async fn get_route_suggestion(&self, incident_id: &str) -> Result<RouteSuggestion, CoreError> {
        let raw = self
            .get_incident_routes(incident_id)
            .await
            .map_err(|e| CoreError::from(e).for_entity("Incident", incident_id))?;
        Ok(route_suggestion(raw, incident_id))
    }

    async fn list_signals(&self) -> Result<Vec<Signal>, CoreError> {
        let raw = DishaClient::list_signals(self).await?;
        Ok(raw.into_iter().map(Signal::from).collect())
    }

    async fn get_stats(&self) -> Result<Stats, CoreError> {
        Ok(DishaClient::get_stats(self).await?.into())
    }

    async fn initialize_signals(&self) -> Result<(), CoreError> {
        let ack = DishaClient::initialize_signals(self).await?;
        debug!(message = ?ack.message, count = ?ack.count, "signals initialized");
        Ok(())
    }

    async fn simulate_traffic(&self, params: &TrafficSimulation) -> Result<SimulationOutcome, CoreError> {
        let body = TrafficSimulationRequest::from(params);
        Ok(DishaClient::simulate_traffic(self, &body).await?.into())
    }
}

// ── Scripted gateway for unit tests ──

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;
use url::Url;

use crate::config::ViewConfig;
use crate::error::CoreError;
use crate::gateway::Gateway;
use crate::model::{
    GeoPoint, Incident, IncidentDraft, IncidentKind, RouteSuggestion, Severity, Signal,
    SignalState, SimulationOutcome, Stats, TrafficSimulation,
};
use crate::view::LiveView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    ListIncidents,
    CreateIncident,
    GetRoute,
    ListSignals,
    GetStats,
    InitializeSignals,
    SimulateTraffic,
}

#[derive(Default)]
struct FakeState {
    incidents: Vec<Incident>,
    signals: Vec<Signal>,
    stats: Stats,
    routes: HashMap<String, RouteSuggestion>,
    calls: HashMap<Op, usize>,
    failures: HashMap<Op, usize>,
    gates: HashMap<Op, VecDeque<oneshot::Receiver<()>>>,
    simulations: Vec<TrafficSimulation>,
    next_id: u32,
}

/// In-memory backend. Responses are computed when a call starts; a held
/// call then waits for its gate before returning them.
#[derive(Clone, Default)]
pub(crate) struct FakeGateway {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub(crate) fn set_incidents(&self, incidents: Vec<Incident>) {
        self.with_state(|s| s.incidents = incidents);
    }

    pub(crate) fn set_signals(&self, signals: Vec<Signal>) {
        self.with_state(|s| s.signals = signals);
    }

    pub(crate) fn set_stats(&self, stats: Stats) {
        self.with_state(|s| s.stats = stats);
    }

    pub(crate) fn set_route(&self, route: RouteSuggestion) {
        self.with_state(|s| s.routes.insert(route.incident_id.clone(), route));
    }

    /// Make the next call of `op` fail.
    pub(crate) fn fail_next(&self, op: Op) {
        self.with_state(|s| *s.failures.entry(op).or_default() += 1);
    }

    /// Hold the next call of `op` until the returned sender fires (or drops).
    pub(crate) fn hold_next(&self, op: Op) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.with_state(|s| s.gates.entry(op).or_default().push_back(rx));
        tx
    }

    pub(crate) fn calls(&self, op: Op) -> usize {
        self.with_state(|s| s.calls.get(&op).copied().unwrap_or(0))
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.with_state(|s| s.calls.values().sum())
    }

    pub(crate) fn simulations(&self) -> Vec<TrafficSimulation> {
        self.with_state(|s| s.simulations.clone())
    }

    /// Record the call and compute its response without holding the lock
    /// across the gate.
    async fn call<T>(
        &self,
        op: Op,
        respond: impl FnOnce(&mut FakeState) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let (result, gate) = self.with_state(|s| {
            *s.calls.entry(op).or_default() += 1;
            let gate = s.gates.get_mut(&op).and_then(VecDeque::pop_front);
            let should_fail = match s.failures.get_mut(&op) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    true
                }
                _ => false,
            };
            let result = if should_fail {
                Err(CoreError::ConnectionFailed {
                    url: "fake://backend".into(),
                    reason: "injected failure".into(),
                })
            } else {
                respond(s)
            };
            (result, gate)
        });
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        result
    }
}

impl Gateway for FakeGateway {
    async fn list_active_incidents(&self) -> Result<Vec<Incident>, CoreError> {
        self.call(Op::ListIncidents, |s| Ok(s.incidents.clone())).await
    }

    async fn create_incident(&self, draft: &IncidentDraft) -> Result<Incident, CoreError> {
        let draft = draft.clone();
        self.call(Op::CreateIncident, move |s| {
            s.next_id += 1;
            let incident = Incident {
                id: format!("inc-{}", s.next_id),
                kind: draft.kind,
                severity: draft.severity,
                description: draft.description,
                location: draft.location,
                reporter_name: draft.reporter_name,
                photo_url: draft.photo_url,
                status: "active".into(),
                reported_at: None,
            };
            s.stats.total_incidents += 1;
            s.stats.active_incidents += 1;
            if incident.severity == Severity::High {
                s.stats.high_severity_count += 1;
            }
            s.routes
                .entry(incident.id.clone())
                .or_insert_with(|| route(&incident.id, "Generated"));
            s.incidents.push(incident.clone());
            Ok(incident)
        })
        .await
    }

    async fn get_route_suggestion(&self, incident_id: &str) -> Result<RouteSuggestion, CoreError> {
        let id = incident_id.to_owned();
        self.call(Op::GetRoute, move |s| {
            s.routes.get(&id).cloned().ok_or(CoreError::NotFound {
                entity_type: "Incident".into(),
                identifier: id,
            })
        })
        .await
    }

    async fn list_signals(&self) -> Result<Vec<Signal>, CoreError> {
        self.call(Op::ListSignals, |s| Ok(s.signals.clone())).await
    }

    async fn get_stats(&self) -> Result<Stats, CoreError> {
        self.call(Op::GetStats, |s| Ok(s.stats)).await
    }

    async fn initialize_signals(&self) -> Result<(), CoreError> {
        self.call(Op::InitializeSignals, |_| Ok(())).await
    }

    async fn simulate_traffic(&self, params: &TrafficSimulation) -> Result<SimulationOutcome, CoreError> {
        let params = params.clone();
        self.call(Op::SimulateTraffic, move |s| {
            let state = if params.emergency_vehicle {
                SignalState::Green
            } else {
                SignalState::Red
            };
            if let Some(signal) = s.signals.iter_mut().find(|sig| sig.id == params.road_id) {
                signal.state = state;
                signal.density = params.density;
            }
            let outcome = SimulationOutcome {
                signal_id: Some(params.road_id.clone()),
                new_state: Some(state),
                density: Some(params.density),
            };
            s.simulations.push(params);
            Ok(outcome)
        })
        .await
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────

pub(crate) fn incident(id: &str, severity: Severity) -> Incident {
    Incident {
        id: id.into(),
        kind: IncidentKind::Accident,
        severity,
        description: format!("incident {id}"),
        location: GeoPoint::BANGALORE,
        reporter_name: None,
        photo_url: None,
        status: "active".into(),
        reported_at: None,
    }
}

pub(crate) fn signal(id: &str, density: u8, state: SignalState) -> Signal {
    Signal {
        id: id.into(),
        location_name: id.replace('_', " "),
        density,
        state,
        position: None,
        last_updated: None,
    }
}

pub(crate) fn route(incident_id: &str, message: &str) -> RouteSuggestion {
    RouteSuggestion {
        incident_id: incident_id.into(),
        ai_message: message.into(),
        safe_route: "Safe".into(),
        eco_route: "Eco".into(),
        fastest_route: "Fast".into(),
        generated_at: None,
    }
}

pub(crate) fn config() -> ViewConfig {
    #[allow(clippy::unwrap_used)]
    let url = Url::parse("http://localhost:8000").unwrap();
    ViewConfig::new(url)
}

pub(crate) fn view(fake: &FakeGateway) -> LiveView<FakeGateway> {
    LiveView::with_gateway(fake.clone(), config())
}

/// Yield until `done` holds, giving spawned tasks a chance to run.
pub(crate) async fn settle(mut done: impl FnMut() -> bool) {
    for _ in 0..100 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

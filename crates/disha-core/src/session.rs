// ── Selection & route-inspection session ──
//
// At most one incident is selected at a time. Selecting one fetches its
// route suggestions; while a selection is open the poll cycle leaves the
// incident and stats caches alone. A response is accepted only if the
// selection still names the incident it was requested for.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::gateway::Gateway;
use crate::model::{Notice, RouteSuggestion};
use crate::view::LiveView;

/// Current state of the inspection session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InspectionState {
    #[default]
    Idle,
    Inspecting {
        incident_id: String,
        /// `None` while the request is outstanding.
        route: Option<Arc<RouteSuggestion>>,
    },
}

impl InspectionState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Inspecting { .. })
    }

    pub fn selected_incident(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Inspecting { incident_id, .. } => Some(incident_id),
        }
    }

    pub fn route(&self) -> Option<&Arc<RouteSuggestion>> {
        match self {
            Self::Inspecting { route, .. } => route.as_ref(),
            Self::Idle => None,
        }
    }

    fn is_pending_for(&self, id: &str) -> bool {
        matches!(self, Self::Inspecting { incident_id, route: None } if incident_id == id)
    }
}

/// Result of [`LiveView::select_incident`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The suggestion was fetched and is now the session's route.
    Loaded(Arc<RouteSuggestion>),
    /// This incident's route was already loaded; no request was made.
    AlreadyLoaded(Arc<RouteSuggestion>),
    /// A request for this incident is already in flight; no request was made.
    Pending,
    /// The response arrived after the selection moved on (or the view was
    /// deactivated) and was discarded.
    Superseded,
}

impl<G: Gateway> LiveView<G> {
    pub fn inspection(&self) -> InspectionState {
        self.inner.inspection.borrow().clone()
    }

    pub fn subscribe_inspection(&self) -> watch::Receiver<InspectionState> {
        self.inner.inspection.subscribe()
    }

    /// Select an incident and fetch its route suggestions.
    ///
    /// Re-selecting the incident that is already selected is a no-op. On
    /// failure the session returns to idle, an error notice is published and
    /// the error is returned, unless the selection has since moved on, in
    /// which case the failure is discarded.
    pub async fn select_incident(&self, incident_id: &str) -> Result<SelectOutcome, CoreError> {
        let mut unchanged = None;
        self.inner.inspection.send_if_modified(|state| match state {
            InspectionState::Inspecting {
                incident_id: current,
                route,
            } if current == incident_id => {
                unchanged = Some(route.as_ref().map_or(SelectOutcome::Pending, |r| {
                    SelectOutcome::AlreadyLoaded(Arc::clone(r))
                }));
                false
            }
            _ => {
                *state = InspectionState::Inspecting {
                    incident_id: incident_id.to_owned(),
                    route: None,
                };
                true
            }
        });
        if let Some(outcome) = unchanged {
            debug!(incident_id, "incident already selected");
            return Ok(outcome);
        }

        debug!(incident_id, "fetching route suggestions");
        let cancel = self.active_token().await;
        let result = self.inner.gateway.get_route_suggestion(incident_id).await;

        if cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            debug!(incident_id, "dropping route response after deactivation");
            return Ok(SelectOutcome::Superseded);
        }

        match result {
            Ok(route) => {
                let route = Arc::new(route);
                let applied = self.inner.inspection.send_if_modified(|state| {
                    if !state.is_pending_for(incident_id) {
                        return false;
                    }
                    *state = InspectionState::Inspecting {
                        incident_id: incident_id.to_owned(),
                        route: Some(Arc::clone(&route)),
                    };
                    true
                });
                if applied {
                    info!(incident_id, "route suggestions loaded");
                    Ok(SelectOutcome::Loaded(route))
                } else {
                    debug!(incident_id, "discarding route for a superseded selection");
                    Ok(SelectOutcome::Superseded)
                }
            }
            Err(e) => {
                let reset = self.inner.inspection.send_if_modified(|state| {
                    if !state.is_pending_for(incident_id) {
                        return false;
                    }
                    *state = InspectionState::Idle;
                    true
                });
                if reset {
                    warn!(incident_id, error = %e, "route suggestions failed");
                    self.notify(Notice::error("Unable to load route suggestions"));
                    Err(e)
                } else {
                    debug!(incident_id, error = %e, "discarding failure for a superseded selection");
                    Ok(SelectOutcome::Superseded)
                }
            }
        }
    }

    /// Close the inspection. Returns `false` if nothing was selected.
    pub fn dismiss_route(&self) -> bool {
        let closed = self
            .inner
            .inspection
            .send_if_modified(|state| std::mem::take(state).is_active());
        if closed {
            debug!("route inspection closed");
        }
        closed
    }
}

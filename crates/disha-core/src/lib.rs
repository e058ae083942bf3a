//! Live client-side state for the Disha traffic-incident backend.
//!
//! This crate sits between `disha-api` and front-ends (the `disha` CLI):
//!
//! - **[`LiveView`]**: central facade. [`activate()`](LiveView::activate)
//!   performs an initial refresh and spawns the poll task;
//!   [`deactivate()`](LiveView::deactivate) cancels it. One-shot callers use
//!   the `fetch_*` methods without activating.
//!
//! - **[`DataStore`]**: reactive caches of incidents, signals and stats built
//!   on `EntityCollection<T>` (`DashMap` + `tokio::sync::watch`). Every write
//!   passes a per-resource sequence guard, so an older response can never
//!   overwrite a newer one.
//!
//! - **Route inspection** ([`InspectionState`], [`SelectOutcome`]): selecting
//!   an incident fetches its route suggestions and pauses incident/stats
//!   polling until dismissed. Late responses for a previous selection are
//!   discarded.
//!
//! - **[`Gateway`]**: the backend seam. Implemented for
//!   [`disha_api::DishaClient`]; tests substitute a scripted gateway.

pub mod config;
pub mod convert;
pub mod error;
pub mod gateway;
pub mod model;
pub mod session;
pub mod simulate;
pub mod store;
pub mod stream;
pub mod sync;
pub mod view;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{EmergencyProfile, TlsVerification, ViewConfig};
pub use error::CoreError;
pub use gateway::Gateway;
pub use session::{InspectionState, SelectOutcome};
pub use simulate::{IncidentReport, random_draft};
pub use store::{DataStore, Resource};
pub use stream::EntityStream;
pub use sync::{RefreshOutcome, TickReport};
pub use view::{BackendInfo, LiveView};

pub use model::{
    GeoPoint, Incident, IncidentDraft, IncidentKind, Notice, NoticeLevel, RouteSuggestion,
    Severity, Signal, SignalState, SimulationOutcome, Stats, TrafficSimulation,
};

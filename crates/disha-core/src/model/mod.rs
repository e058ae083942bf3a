// ── Domain model ──
//
// Canonical types the rest of the workspace works with. Wire shapes live
// in `disha_api::models`; `crate::convert` maps between the two.

pub mod incident;
pub mod notice;
pub mod route;
pub mod signal;
pub mod simulation;
pub mod stats;

pub use incident::{GeoPoint, Incident, IncidentDraft, IncidentKind, Severity};
pub use notice::{Notice, NoticeLevel};
pub use route::RouteSuggestion;
pub use signal::{Signal, SignalState};
pub use simulation::{SimulationOutcome, TrafficSimulation};
pub use stats::Stats;

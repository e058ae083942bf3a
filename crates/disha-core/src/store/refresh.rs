// ── Refresh application logic ──
//
// Applies fetched collections to the DataStore, one resource at a time.
// Every apply is gated by that resource's sequence guard.

use chrono::Utc;
use serde::Serialize;
use strum::Display;

use super::DataStore;
use super::sequence::{SequenceGuard, Ticket};
use crate::model::{Incident, Signal, Stats};

/// One independently refreshed backend collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    Incidents,
    Signals,
    Stats,
}

impl DataStore {
    fn guard(&self, resource: Resource) -> &SequenceGuard {
        match resource {
            Resource::Incidents => &self.incidents_seq,
            Resource::Signals => &self.signals_seq,
            Resource::Stats => &self.stats_seq,
        }
    }

    /// Take a ticket for a request about to go out.
    pub(crate) fn issue(&self, resource: Resource) -> Ticket {
        self.guard(resource).issue()
    }

    /// Upsert-and-prune the incident cache. `false` if the ticket was stale.
    pub(crate) fn apply_incidents(&self, ticket: Ticket, items: Vec<Incident>) -> bool {
        self.incidents_seq.commit(ticket, || {
            self.incidents
                .replace_all(items.into_iter().map(|i| (i.id.clone(), i)));
            self.touch();
        })
    }

    pub(crate) fn apply_signals(&self, ticket: Ticket, items: Vec<Signal>) -> bool {
        self.signals_seq.commit(ticket, || {
            self.signals
                .replace_all(items.into_iter().map(|s| (s.id.clone(), s)));
            self.touch();
        })
    }

    pub(crate) fn apply_stats(&self, ticket: Ticket, stats: Stats) -> bool {
        self.stats_seq.commit(ticket, || {
            self.stats.send_if_modified(|current| {
                if *current == stats {
                    return false;
                }
                *current = stats;
                true
            });
            self.touch();
        })
    }

    fn touch(&self) {
        self.last_refresh.send_replace(Some(Utc::now()));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{GeoPoint, IncidentKind, Severity};

    fn incident(id: &str, description: &str) -> Incident {
        Incident {
            id: id.into(),
            kind: IncidentKind::TrafficJam,
            severity: Severity::Medium,
            description: description.into(),
            location: GeoPoint::BANGALORE,
            reporter_name: None,
            photo_url: None,
            status: "active".into(),
            reported_at: None,
        }
    }

    #[test]
    fn stale_incident_batch_is_dropped() {
        let store = DataStore::new();
        let older = store.issue(Resource::Incidents);
        let newer = store.issue(Resource::Incidents);

        assert!(store.apply_incidents(newer, vec![incident("a", "fresh")]));
        assert!(!store.apply_incidents(older, vec![incident("a", "stale"), incident("b", "stale")]));

        let snap = store.incidents_snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].description, "fresh");
    }

    #[test]
    fn resources_are_sequenced_independently() {
        let store = DataStore::new();
        let incidents = store.issue(Resource::Incidents);
        let stats = store.issue(Resource::Stats);
        let stats_again = store.issue(Resource::Stats);

        assert!(store.apply_stats(stats_again, Stats { total_incidents: 2, ..Stats::default() }));
        assert!(!store.apply_stats(stats, Stats::default()));
        assert!(store.apply_incidents(incidents, vec![incident("a", "x")]));
        assert_eq!(store.stats().total_incidents, 2);
    }

    #[test]
    fn apply_records_refresh_time() {
        let store = DataStore::new();
        assert!(store.last_refresh().is_none());
        let ticket = store.issue(Resource::Signals);
        store.apply_signals(ticket, Vec::new());
        assert!(store.last_refresh().is_some());
    }
}

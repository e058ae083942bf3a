// ── Central reactive data store ──
//
// Cached copies of the backend-owned collections. Every cache is at most
// one poll interval stale; mutations are broadcast via `watch` channels.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::collection::EntityCollection;
use super::sequence::SequenceGuard;
use crate::model::{Incident, Signal, Stats};
use crate::stream::EntityStream;

/// Central reactive store for incidents, signals and stats.
///
/// All reads are wait-free snapshot clones. Writes come only from the
/// refresh path, gated by a per-resource [`SequenceGuard`].
pub struct DataStore {
    pub(crate) incidents: EntityCollection<Incident>,
    pub(crate) signals: EntityCollection<Signal>,
    pub(crate) stats: watch::Sender<Stats>,
    pub(crate) last_refresh: watch::Sender<Option<DateTime<Utc>>>,
    pub(crate) incidents_seq: SequenceGuard,
    pub(crate) signals_seq: SequenceGuard,
    pub(crate) stats_seq: SequenceGuard,
}

impl DataStore {
    pub fn new() -> Self {
        let (stats, _) = watch::channel(Stats::default());
        let (last_refresh, _) = watch::channel(None);

        Self {
            incidents: EntityCollection::new(),
            signals: EntityCollection::new(),
            stats,
            last_refresh,
            incidents_seq: SequenceGuard::default(),
            signals_seq: SequenceGuard::default(),
            stats_seq: SequenceGuard::default(),
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn incidents_snapshot(&self) -> Arc<Vec<Arc<Incident>>> {
        self.incidents.snapshot()
    }

    pub fn signals_snapshot(&self) -> Arc<Vec<Arc<Signal>>> {
        self.signals.snapshot()
    }

    pub fn stats(&self) -> Stats {
        *self.stats.borrow()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn incident(&self, id: &str) -> Option<Arc<Incident>> {
        self.incidents.get(id)
    }

    pub fn signal(&self, id: &str) -> Option<Arc<Signal>> {
        self.signals.get(id)
    }

    pub fn incident_count(&self) -> usize {
        self.incidents.len()
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_incidents(&self) -> EntityStream<Incident> {
        EntityStream::new(self.incidents.subscribe())
    }

    pub fn subscribe_signals(&self) -> EntityStream<Signal> {
        EntityStream::new(self.signals.subscribe())
    }

    pub fn subscribe_stats(&self) -> watch::Receiver<Stats> {
        self.stats.subscribe()
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// When any resource was last applied to the store.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

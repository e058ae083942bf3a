// ── Polling synchronizer ──
//
// Activation lifecycle and the periodic refresh cycle. Each resource is
// fetched and applied independently: one failing never blocks the others,
// and a response is applied only if it is the newest issued for its
// resource and its activation has not been cancelled.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::gateway::Gateway;
use crate::store::{DataStore, Resource, Ticket};
use crate::view::{Activation, LiveView};

/// What happened to one resource during a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The response was written to the cache.
    Applied,
    /// A newer request for the same resource had already been applied.
    Stale,
    /// Not requested, or not applied, because a route inspection is open.
    Skipped,
    /// The activation it belonged to ended before the response arrived.
    Cancelled,
    /// The request failed; the cache keeps its previous contents.
    Failed(String),
}

/// Who asked for a refresh. Poll cycles yield to an open inspection;
/// explicit requests do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Poll,
    Request,
}

impl RefreshOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Per-resource result of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub incidents: RefreshOutcome,
    pub signals: RefreshOutcome,
    pub stats: RefreshOutcome,
}

impl TickReport {
    /// Failed resources and their error messages.
    pub fn failures(&self) -> Vec<(Resource, &str)> {
        [
            (Resource::Incidents, &self.incidents),
            (Resource::Signals, &self.signals),
            (Resource::Stats, &self.stats),
        ]
        .into_iter()
        .filter_map(|(resource, outcome)| match outcome {
            RefreshOutcome::Failed(msg) => Some((resource, msg.as_str())),
            _ => None,
        })
        .collect()
    }
}

impl<G: Gateway> LiveView<G> {
    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start live synchronization.
    ///
    /// Seeds the demo signals (if configured), performs one full refresh,
    /// then spawns the poll task. Returns the initial refresh report, or
    /// `None` if the view was already active.
    pub async fn activate(&self) -> Option<TickReport> {
        let cancel = {
            let mut slot = self.inner.activation.lock().await;
            if slot.is_some() {
                debug!("live view already active");
                return None;
            }
            let cancel = CancellationToken::new();
            *slot = Some(Activation {
                cancel: cancel.clone(),
                task: None,
            });
            cancel
        };

        if self.inner.config.initialize_signals {
            if let Err(e) = self.inner.gateway.initialize_signals().await {
                warn!(error = %e, "signal initialization failed");
            }
        }

        let report = self.full_refresh(Some(&cancel), Origin::Poll).await;
        log_report(&report);

        let period = self.inner.config.poll_interval;
        if !period.is_zero() && !cancel.is_cancelled() {
            let handle = tokio::spawn(poll_task(self.clone(), period, cancel.clone()));
            let mut slot = self.inner.activation.lock().await;
            // A deactivate that raced us has already cancelled the token;
            // the task sees that and exits on its own.
            if let Some(active) = slot.as_mut().filter(|_| !cancel.is_cancelled()) {
                active.task = Some(handle);
            }
        }

        info!(interval = ?period, "live view activated");
        Some(report)
    }

    /// Stop live synchronization and close any open inspection.
    ///
    /// In-flight poll requests are dropped; responses from other in-flight
    /// requests are discarded on arrival. Returns `false` if the view was not
    /// active.
    pub async fn deactivate(&self) -> bool {
        let Some(activation) = self.inner.activation.lock().await.take() else {
            return false;
        };
        activation.cancel.cancel();
        if let Some(task) = activation.task {
            if let Err(e) = task.await {
                warn!(error = %e, "poll task ended abnormally");
            }
        }
        self.inner
            .inspection
            .send_if_modified(|state| std::mem::take(state).is_active());
        info!("live view deactivated");
        true
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Run one poll cycle now, under the current activation (if any).
    ///
    /// While a route is being inspected only signals are refreshed.
    pub async fn tick(&self) -> TickReport {
        let cancel = self.active_token().await;
        self.run_tick(cancel.as_ref()).await
    }

    /// Refresh every resource regardless of inspection state.
    pub async fn refresh_all(&self) -> TickReport {
        let cancel = self.active_token().await;
        self.full_refresh(cancel.as_ref(), Origin::Request).await
    }

    pub async fn refresh(&self, resource: Resource) -> RefreshOutcome {
        let cancel = self.active_token().await;
        self.refresh_with(resource, cancel.as_ref()).await
    }

    pub(crate) async fn run_tick(&self, cancel: Option<&CancellationToken>) -> TickReport {
        if self.inner.inspection.borrow().is_active() {
            let signals = self.refresh_from(Resource::Signals, cancel, Origin::Poll).await;
            return TickReport {
                incidents: RefreshOutcome::Skipped,
                signals,
                stats: RefreshOutcome::Skipped,
            };
        }
        self.full_refresh(cancel, Origin::Poll).await
    }

    async fn full_refresh(&self, cancel: Option<&CancellationToken>, origin: Origin) -> TickReport {
        let (incidents, signals, stats) = tokio::join!(
            self.refresh_from(Resource::Incidents, cancel, origin),
            self.refresh_from(Resource::Signals, cancel, origin),
            self.refresh_from(Resource::Stats, cancel, origin),
        );
        TickReport {
            incidents,
            signals,
            stats,
        }
    }

    /// Refresh after a local change, but only while the view is live.
    pub(crate) async fn refresh_if_active(&self, resources: &[Resource]) {
        let Some(cancel) = self.active_token().await else {
            return;
        };
        for &resource in resources {
            self.refresh_with(resource, Some(&cancel)).await;
        }
    }

    pub(crate) async fn refresh_with(
        &self,
        resource: Resource,
        cancel: Option<&CancellationToken>,
    ) -> RefreshOutcome {
        self.refresh_from(resource, cancel, Origin::Request).await
    }

    async fn refresh_from(
        &self,
        resource: Resource,
        cancel: Option<&CancellationToken>,
        origin: Origin,
    ) -> RefreshOutcome {
        let gateway = &self.inner.gateway;
        match resource {
            Resource::Incidents => {
                self.fetch_and_apply(
                    resource,
                    cancel,
                    origin,
                    gateway.list_active_incidents(),
                    DataStore::apply_incidents,
                )
                .await
            }
            Resource::Signals => {
                self.fetch_and_apply(
                    resource,
                    cancel,
                    origin,
                    gateway.list_signals(),
                    DataStore::apply_signals,
                )
                .await
            }
            Resource::Stats => {
                self.fetch_and_apply(resource, cancel, origin, gateway.get_stats(), DataStore::apply_stats)
                    .await
            }
        }
    }

    async fn fetch_and_apply<T>(
        &self,
        resource: Resource,
        cancel: Option<&CancellationToken>,
        origin: Origin,
        fetch: impl Future<Output = Result<T, CoreError>>,
        apply: fn(&DataStore, Ticket, T) -> bool,
    ) -> RefreshOutcome {
        let store = &self.inner.store;
        let ticket = store.issue(resource);

        let value = match fetch.await {
            Ok(value) => value,
            Err(e) => {
                warn!(%resource, error = %e, "refresh failed");
                return RefreshOutcome::Failed(e.to_string());
            }
        };

        if cancel.is_some_and(CancellationToken::is_cancelled) {
            debug!(%resource, "dropping response from a cancelled activation");
            return RefreshOutcome::Cancelled;
        }
        // An inspection may have opened while the request was in flight.
        if origin == Origin::Poll
            && resource != Resource::Signals
            && self.inner.inspection.borrow().is_active()
        {
            debug!(%resource, "dropping poll response while inspecting");
            return RefreshOutcome::Skipped;
        }
        if apply(store, ticket, value) {
            RefreshOutcome::Applied
        } else {
            debug!(%resource, "dropping stale response");
            RefreshOutcome::Stale
        }
    }
}

fn log_report(report: &TickReport) {
    let failures = report.failures();
    if failures.is_empty() {
        debug!(?report, "refresh cycle complete");
    } else {
        debug!(?report, failed = failures.len(), "refresh cycle completed with failures");
    }
}

/// Periodic refresh driven by `interval`, stopped by `cancel`.
async fn poll_task<G: Gateway>(view: LiveView<G>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    report = view.run_tick(Some(&cancel)) => log_report(&report),
                }
            }
        }
    }
    debug!("poll task stopped");
}

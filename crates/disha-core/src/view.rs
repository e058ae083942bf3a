// ── Live view facade ──
//
// Single entry point for front-ends. Owns the gateway, the caches, the
// inspection session and the activation lifecycle. Cheaply cloneable via
// `Arc<ViewInner>`; background tasks hold their own clone.

use std::sync::Arc;

use disha_api::{DishaClient, TlsMode, TransportConfig};
use serde::Serialize;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{TlsVerification, ViewConfig};
use crate::error::CoreError;
use crate::gateway::Gateway;
use crate::model::{Incident, Notice, RouteSuggestion, Signal, Stats};
use crate::session::InspectionState;
use crate::store::DataStore;

const NOTICE_CHANNEL_SIZE: usize = 64;

/// Backend banner returned by the API root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendInfo {
    pub message: String,
    pub version: Option<String>,
}

/// The client-side view of one Disha backend.
///
/// Construct with [`LiveView::connect`] (real HTTP backend) or
/// [`LiveView::with_gateway`], then [`activate`](Self::activate) to start
/// polling. One-shot callers can skip activation and use the `fetch_*`
/// methods directly.
pub struct LiveView<G: Gateway = DishaClient> {
    pub(crate) inner: Arc<ViewInner<G>>,
}

pub(crate) struct ViewInner<G: Gateway> {
    pub(crate) gateway: G,
    pub(crate) config: ViewConfig,
    pub(crate) store: Arc<DataStore>,
    pub(crate) inspection: watch::Sender<InspectionState>,
    pub(crate) notices: broadcast::Sender<Notice>,
    /// Present while active. Replaced wholesale on every activation.
    pub(crate) activation: Mutex<Option<Activation>>,
}

pub(crate) struct Activation {
    pub(crate) cancel: CancellationToken,
    pub(crate) task: Option<JoinHandle<()>>,
}

impl<G: Gateway> Clone for LiveView<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl LiveView<DishaClient> {
    /// Build a view backed by the HTTP client. Does not touch the network.
    pub fn connect(config: ViewConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default()
            .with_timeout(config.timeout)
            .with_tls(tls_to_transport(&config.tls));
        let client = DishaClient::new(config.url.as_str(), &transport)?;
        debug!(base_url = %client.base_url(), "backend client ready");
        Ok(Self::with_gateway(client, config))
    }

    // ── Ad-hoc queries (not cached) ──────────────────────────────────

    /// All incidents, or those with the given status.
    pub async fn list_incidents(&self, status: Option<&str>) -> Result<Vec<Incident>, CoreError> {
        let raw = self.inner.gateway.list_incidents(status).await?;
        Ok(raw.into_iter().map(Incident::from).collect())
    }

    pub async fn get_incident(&self, incident_id: &str) -> Result<Incident, CoreError> {
        let raw = self
            .inner
            .gateway
            .get_incident(incident_id)
            .await
            .map_err(|e| CoreError::from(e).for_entity("Incident", incident_id))?;
        Ok(raw.into())
    }

    pub async fn backend_info(&self) -> Result<BackendInfo, CoreError> {
        let raw = self.inner.gateway.get_info().await?;
        Ok(BackendInfo {
            message: raw.message,
            version: raw.version,
        })
    }
}

impl<G: Gateway> LiveView<G> {
    pub fn with_gateway(gateway: G, config: ViewConfig) -> Self {
        let (inspection, _) = watch::channel(InspectionState::Idle);
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);

        Self {
            inner: Arc::new(ViewInner {
                gateway,
                config,
                store: Arc::new(DataStore::new()),
                inspection,
                notices,
                activation: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Notices ──────────────────────────────────────────────────────

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    pub(crate) fn notify(&self, notice: Notice) {
        debug!(level = %notice.level, message = %notice.message, "notice");
        // No receivers is fine: one-shot callers never subscribe.
        let _ = self.inner.notices.send(notice);
    }

    // ── Activation state ─────────────────────────────────────────────

    pub async fn is_active(&self) -> bool {
        self.inner.activation.lock().await.is_some()
    }

    /// Token of the current activation, if any.
    pub(crate) async fn active_token(&self) -> Option<CancellationToken> {
        self.inner
            .activation
            .lock()
            .await
            .as_ref()
            .map(|a| a.cancel.clone())
    }

    // ── Direct gateway passthroughs (not cached) ─────────────────────

    pub async fn fetch_active_incidents(&self) -> Result<Vec<Incident>, CoreError> {
        self.inner.gateway.list_active_incidents().await
    }

    pub async fn fetch_signals(&self) -> Result<Vec<Signal>, CoreError> {
        self.inner.gateway.list_signals().await
    }

    pub async fn fetch_stats(&self) -> Result<Stats, CoreError> {
        self.inner.gateway.get_stats().await
    }

    /// Route suggestions for one incident, bypassing the inspection session.
    pub async fn fetch_route(&self, incident_id: &str) -> Result<RouteSuggestion, CoreError> {
        self.inner.gateway.get_route_suggestion(incident_id).await
    }

    pub async fn initialize_signals(&self) -> Result<(), CoreError> {
        self.inner.gateway.initialize_signals().await
    }
}

pub(crate) fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

// ── Runtime view configuration ──
//
// These types describe *how* to reach the backend and how the live view
// behaves once running. They never touch disk: the CLI builds a
// `ViewConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::model::GeoPoint;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed dev servers).
    DangerAcceptInvalid,
}

/// Parameters of the one-click "emergency vehicle" simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyProfile {
    pub road_id: String,
    pub density: u8,
    pub avg_speed: f64,
}

impl Default for EmergencyProfile {
    fn default() -> Self {
        Self {
            road_id: "SILK_BOARD".into(),
            density: 95,
            avg_speed: 15.0,
        }
    }
}

/// Configuration for one live view of one backend.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Backend URL, e.g. `http://localhost:8000`. `/api` is appended if missing.
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Poll period while active. Zero disables the background poll task.
    pub poll_interval: Duration,
    /// Call `initialize_signals` once on activation.
    pub initialize_signals: bool,
    /// How long the report flow waits before asking for route analysis.
    pub analysis_delay: Duration,
    pub emergency: EmergencyProfile,
    /// Centre of the random-incident scatter.
    pub home: GeoPoint,
}

impl ViewConfig {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            initialize_signals: true,
            analysis_delay: Duration::from_millis(1500),
            emergency: EmergencyProfile::default(),
            home: GeoPoint::BANGALORE,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

//! Configuration for the Disha CLI.
//!
//! A single TOML file layered under `DISHA_`-prefixed environment variables,
//! and translation to `disha_core::ViewConfig`. The CLI adds flag overrides
//! on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use disha_core::{EmergencyProfile, GeoPoint, TlsVerification, ViewConfig};

/// Environment variable prefix. Nested keys use a double underscore,
/// e.g. `DISHA_EMERGENCY__ROAD_ID`.
pub const ENV_PREFIX: &str = "DISHA_";

/// The one variable every deployment needs.
pub const API_URL_ENV: &str = "DISHA_API_URL";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no backend URL configured")]
    MissingApiUrl,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Backend base URL, e.g. "http://localhost:8000".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub insecure: bool,

    /// Path to a PEM CA certificate for self-hosted TLS backends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub initialize_signals: bool,

    #[serde(default = "default_analysis_delay")]
    pub analysis_delay_ms: u64,

    #[serde(default)]
    pub emergency: Emergency,

    #[serde(default)]
    pub home: Home,

    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            poll_interval_secs: default_poll_interval(),
            timeout_secs: default_timeout(),
            insecure: false,
            ca_cert: None,
            initialize_signals: true,
            analysis_delay_ms: default_analysis_delay(),
            emergency: Emergency::default(),
            home: Home::default(),
            output: default_output(),
            color: default_color(),
        }
    }
}

/// The one-click emergency simulation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Emergency {
    #[serde(default = "default_road")]
    pub road_id: String,
    #[serde(default = "default_emergency_density")]
    pub density: u8,
    #[serde(default = "default_emergency_speed")]
    pub avg_speed: f64,
}

impl Default for Emergency {
    fn default() -> Self {
        Self {
            road_id: default_road(),
            density: default_emergency_density(),
            avg_speed: default_emergency_speed(),
        }
    }
}

/// Centre point for simulated incidents.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Home {
    pub lat: f64,
    pub lng: f64,
}

impl Default for Home {
    fn default() -> Self {
        Self {
            lat: GeoPoint::BANGALORE.lat,
            lng: GeoPoint::BANGALORE.lng,
        }
    }
}

fn default_poll_interval() -> u64 {
    5
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_analysis_delay() -> u64 {
    1500
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_road() -> String {
    EmergencyProfile::default().road_id
}
fn default_emergency_density() -> u8 {
    EmergencyProfile::default().density
}
fn default_emergency_speed() -> f64 {
    EmergencyProfile::default().avg_speed
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "disha", "disha").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("disha");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file at `path` (if present), then environment.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment_for(path).extract()?)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Build a `ViewConfig`. Fails if no backend URL is configured or any
    /// value is out of range.
    pub fn to_view_config(&self) -> Result<ViewConfig, ConfigError> {
        let raw = self
            .api_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingApiUrl)?;
        let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "api_url".into(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.emergency.density > 100 {
            return Err(ConfigError::Validation {
                field: "emergency.density".into(),
                reason: format!("expected 0-100, got {}", self.emergency.density),
            });
        }
        let home = GeoPoint::new(self.home.lat, self.home.lng);
        if !home.is_valid() {
            return Err(ConfigError::Validation {
                field: "home".into(),
                reason: format!("coordinates out of range: {}, {}", home.lat, home.lng),
            });
        }

        let tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        let mut view = ViewConfig::new(url);
        view.tls = tls;
        view.timeout = Duration::from_secs(self.timeout_secs);
        view.poll_interval = Duration::from_secs(self.poll_interval_secs);
        view.initialize_signals = self.initialize_signals;
        view.analysis_delay = Duration::from_millis(self.analysis_delay_ms);
        view.emergency = EmergencyProfile {
            road_id: self.emergency.road_id.clone(),
            density: self.emergency.density,
            avg_speed: self.emergency.avg_speed,
        };
        view.home = home;
        Ok(view)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    fn load(path: &str) -> figment::Result<Config> {
        load_config_from(Path::new(path)).map_err(|e| e.to_string().into())
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        Jail::expect_with(|_jail| {
            let cfg = load("missing.toml")?;
            assert_eq!(cfg, Config::default());
            assert_eq!(cfg.poll_interval_secs, 5);
            assert_eq!(cfg.emergency.road_id, "SILK_BOARD");
            assert!(cfg.api_url.is_none());
            Ok(())
        });
    }

    #[test]
    fn file_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    api_url = "http://file.example:8000"
                    poll_interval_secs = 10

                    [emergency]
                    road_id = "HEBBAL"
                "#,
            )?;
            jail.set_env("DISHA_API_URL", "http://env.example:9000");
            jail.set_env("DISHA_EMERGENCY__DENSITY", "80");

            let cfg = load("config.toml")?;
            assert_eq!(cfg.api_url.as_deref(), Some("http://env.example:9000"));
            assert_eq!(cfg.poll_interval_secs, 10);
            assert_eq!(cfg.emergency.road_id, "HEBBAL");
            assert_eq!(cfg.emergency.density, 80);
            assert!((cfg.emergency.avg_speed - 15.0).abs() < f64::EPSILON);
            Ok(())
        });
    }

    #[test]
    fn view_config_requires_an_api_url() {
        let err = Config::default().to_view_config().unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiUrl));
    }

    #[test]
    fn view_config_translates_every_knob() {
        let cfg = Config {
            api_url: Some("https://disha.example".into()),
            poll_interval_secs: 0,
            analysis_delay_ms: 250,
            ca_cert: Some(PathBuf::from("/etc/ssl/disha.pem")),
            initialize_signals: false,
            ..Config::default()
        };
        let view = cfg.to_view_config().unwrap();
        assert_eq!(view.url.as_str(), "https://disha.example/");
        assert!(view.poll_interval.is_zero());
        assert_eq!(view.analysis_delay, Duration::from_millis(250));
        assert_eq!(view.tls, TlsVerification::CustomCa(PathBuf::from("/etc/ssl/disha.pem")));
        assert!(!view.initialize_signals);
    }

    #[test]
    fn insecure_wins_over_ca_cert() {
        let cfg = Config {
            api_url: Some("https://disha.example".into()),
            insecure: true,
            ca_cert: Some(PathBuf::from("ca.pem")),
            ..Config::default()
        };
        assert_eq!(cfg.to_view_config().unwrap().tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let base = Config {
            api_url: Some("http://localhost:8000".into()),
            ..Config::default()
        };

        let bad_density = Config {
            emergency: Emergency {
                density: 120,
                ..Emergency::default()
            },
            ..base.clone()
        };
        assert!(matches!(
            bad_density.to_view_config().unwrap_err(),
            ConfigError::Validation { ref field, .. } if field == "emergency.density"
        ));

        let bad_home = Config {
            home: Home { lat: 95.0, lng: 0.0 },
            ..base.clone()
        };
        assert!(bad_home.to_view_config().is_err());

        let bad_scheme = Config {
            api_url: Some("ftp://localhost".into()),
            ..base
        };
        assert!(bad_scheme.to_view_config().is_err());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            api_url: Some("http://localhost:8000".into()),
            home: Home { lat: 28.6139, lng: 77.209 },
            ..Config::default()
        };
        save_config_to(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("api_url = \"http://localhost:8000\""));
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }
}

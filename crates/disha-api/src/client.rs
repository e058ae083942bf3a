// Async HTTP client for the Disha backend.
//
// Base path: {base_url}/api/
// Auth: none (the backend is an open demo service)

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    ApiInfoResponse, ErrorResponse, IncidentCreateRequest, IncidentResponse,
    InitializeSignalsResponse, RouteAnalysisResponse, SignalResponse, SimulationResponse,
    StatsResponse, TrafficSimulationRequest,
};
use crate::transport::TransportConfig;

/// Status filter used by the map view's incident query.
pub const ACTIVE_STATUS: &str = "active";

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Disha backend API.
///
/// Each method is one independent request/response exchange. Nothing is
/// cached and nothing is retried: failures come back to the caller as-is.
#[derive(Debug, Clone)]
pub struct DishaClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DishaClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url` using the given transport settings.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Build the base URL so that it always ends with `/api/`.
    ///
    /// `http://host:8000` -> `http://host:8000/api/`
    /// `http://host:8000/api` -> `http://host:8000/api/`
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw.trim())?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }
        url.set_query(None);
        url.set_fragment(None);

        Ok(url)
    }

    /// The normalized API base (always ends with `/api/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, &str)],
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_response(resp).await
    }

    /// POST where the response body is optional; an empty body decodes as `T::default()`.
    async fn post_lenient<T: DeserializeOwned + Default, B: Serialize + Sync>(
        &self,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let builder = self.http.post(url);
        let builder = match body {
            Some(b) => builder.json(b),
            None => builder,
        };
        let resp = builder.send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(parse_error(status, resp).await);
        }
        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(T::default());
        }
        decode(body)
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── System ───────────────────────────────────────────────────────

    /// Backend banner (`GET /`). Handy as a connectivity probe.
    pub async fn get_info(&self) -> Result<ApiInfoResponse, Error> {
        self.get(self.base_url.clone()).await
    }

    // ── Incidents ────────────────────────────────────────────────────

    /// List incidents, optionally filtered by status.
    pub async fn list_incidents(&self, status: Option<&str>) -> Result<Vec<IncidentResponse>, Error> {
        let url = self.url(&["incidents"])?;
        match status {
            Some(s) => self.get_with_params(url, &[("status", s)]).await,
            None => self.get(url).await,
        }
    }

    /// List incidents the backend currently considers active.
    pub async fn list_active_incidents(&self) -> Result<Vec<IncidentResponse>, Error> {
        self.list_incidents(Some(ACTIVE_STATUS)).await
    }

    pub async fn get_incident(&self, incident_id: &str) -> Result<IncidentResponse, Error> {
        self.get(self.url(&["incidents", incident_id])?).await
    }

    /// Submit a new incident. The backend assigns the identifier.
    pub async fn create_incident(
        &self,
        body: &IncidentCreateRequest,
    ) -> Result<IncidentResponse, Error> {
        self.post(self.url(&["incidents"])?, body).await
    }

    /// Route suggestions computed for an incident.
    pub async fn get_incident_routes(
        &self,
        incident_id: &str,
    ) -> Result<RouteAnalysisResponse, Error> {
        self.get(self.url(&["incidents", incident_id, "routes"])?)
            .await
    }

    // ── Signals ──────────────────────────────────────────────────────

    pub async fn list_signals(&self) -> Result<Vec<SignalResponse>, Error> {
        self.get(self.url(&["signals"])?).await
    }

    /// Seed the demo signal set. Idempotent on the backend side.
    pub async fn initialize_signals(&self) -> Result<InitializeSignalsResponse, Error> {
        self.post_lenient::<_, ()>(self.url(&["signals", "initialize"])?, None)
            .await
    }

    // ── Stats ────────────────────────────────────────────────────────

    pub async fn get_stats(&self) -> Result<StatsResponse, Error> {
        self.get(self.url(&["stats"])?).await
    }

    // ── Simulation ───────────────────────────────────────────────────

    /// Push a traffic reading for one road; the backend recomputes the signal.
    pub async fn simulate_traffic(
        &self,
        body: &TrafficSimulationRequest,
    ) -> Result<SimulationResponse, Error> {
        self.post_lenient(self.url(&["simulate", "traffic"])?, Some(body))
            .await
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        decode(body)
    } else {
        Err(parse_error(status, resp).await)
    }
}

fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ErrorResponse>(&raw)
        .ok()
        .and_then(|e| e.message())
        .unwrap_or_else(|| {
            if raw.is_empty() {
                status.to_string()
            } else {
                raw.chars().take(200).collect()
            }
        });

    match status {
        reqwest::StatusCode::NOT_FOUND => Error::NotFound { message },
        reqwest::StatusCode::BAD_REQUEST | reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
            Error::Validation {
                status: status.as_u16(),
                message,
            }
        }
        _ => Error::Api {
            status: status.as_u16(),
            message,
        },
    }
}

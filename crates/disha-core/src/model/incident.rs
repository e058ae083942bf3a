// ── Incident domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::CoreError;

/// Incident category.
///
/// Values the backend sends that are not in this set decode to
/// [`IncidentKind::Unknown`] so a single odd record never fails a whole list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum IncidentKind {
    TrafficJam,
    Accident,
    RoadWork,
    Emergency,
    Unknown,
}

impl IncidentKind {
    /// Kinds the random-incident simulation draws from.
    pub const SIMULATED: [Self; 3] = [Self::TrafficJam, Self::Accident, Self::RoadWork];

    /// Parse the backend's wire value, falling back to `Unknown`.
    pub fn from_wire(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Unknown)
    }

    /// Human label, e.g. "Traffic jam".
    pub fn label(self) -> &'static str {
        match self {
            Self::TrafficJam => "Traffic jam",
            Self::Accident => "Accident",
            Self::RoadWork => "Road work",
            Self::Emergency => "Emergency",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum Severity {
    /// Unrecognized on the wire; never outranks a known level.
    Unknown,
    Low,
    Medium,
    High,
}

impl Severity {
    pub const KNOWN: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn from_wire(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Unknown)
    }
}

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Bangalore city centre.
    pub const BANGALORE: Self = Self {
        lat: 12.9716,
        lng: 77.5946,
    };

    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::BANGALORE
    }
}

/// A reported traffic or safety event, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub kind: IncidentKind,
    pub severity: Severity,
    pub description: String,
    pub location: GeoPoint,
    pub reporter_name: Option<String>,
    pub photo_url: Option<String>,
    pub status: String,
    pub reported_at: Option<DateTime<Utc>>,
}

impl Incident {
    pub fn is_active(&self) -> bool {
        self.status == disha_api::ACTIVE_STATUS
    }
}

/// Client-side incident draft, validated before it leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentDraft {
    pub kind: IncidentKind,
    pub severity: Severity,
    pub description: String,
    pub location: GeoPoint,
    pub reporter_name: Option<String>,
    pub photo_url: Option<String>,
}

impl IncidentDraft {
    pub fn new(
        kind: IncidentKind,
        severity: Severity,
        description: impl Into<String>,
        location: GeoPoint,
    ) -> Self {
        Self {
            kind,
            severity,
            description: description.into(),
            location,
            reporter_name: None,
            photo_url: None,
        }
    }

    pub fn with_reporter(mut self, name: impl Into<String>) -> Self {
        self.reporter_name = Some(name.into());
        self
    }

    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// Reject drafts the backend would refuse anyway.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.description.trim().is_empty() {
            return Err(CoreError::validation("description must not be empty"));
        }
        if self.kind == IncidentKind::Unknown {
            return Err(CoreError::validation("incident type is required"));
        }
        if self.severity == Severity::Unknown {
            return Err(CoreError::validation("severity is required"));
        }
        if !self.location.is_valid() {
            return Err(CoreError::validation(format!(
                "coordinates out of range: lat {}, lng {}",
                self.location.lat, self.location.lng
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft(description: &str, location: GeoPoint) -> IncidentDraft {
        IncidentDraft::new(IncidentKind::Accident, Severity::High, description, location)
    }

    #[test]
    fn unknown_wire_values_fall_back() {
        assert_eq!(IncidentKind::from_wire("road_work"), IncidentKind::RoadWork);
        assert_eq!(IncidentKind::from_wire("landslide"), IncidentKind::Unknown);
        assert_eq!(Severity::from_wire("high"), Severity::High);
        assert_eq!(Severity::from_wire("catastrophic"), Severity::Unknown);
    }

    #[test]
    fn wire_names_are_snake_case() {
        assert_eq!(IncidentKind::TrafficJam.to_string(), "traffic_jam");
        assert_eq!(Severity::Medium.as_ref(), "medium");
    }

    #[test]
    fn blank_description_is_rejected() {
        let err = draft("   ", GeoPoint::BANGALORE).validate().unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(draft("pothole", GeoPoint::new(91.0, 0.0)).validate().is_err());
        assert!(draft("pothole", GeoPoint::new(0.0, -180.5)).validate().is_err());
        assert!(draft("pothole", GeoPoint::new(f64::NAN, 0.0)).validate().is_err());
        assert!(draft("pothole", GeoPoint::new(-90.0, 180.0)).validate().is_ok());
    }

    #[test]
    fn severity_orders_by_urgency() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Unknown);
        assert_eq!(
            [Severity::High, Severity::from_wire("catastrophic"), Severity::Low].iter().max(),
            Some(&Severity::High)
        );
    }
}

//! Issue models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

/// Centre used when a radius query omits `lat`/`lng` (Bangalore)
pub const DEFAULT_LATITUDE: f64 = 12.9716;
pub const DEFAULT_LONGITUDE: f64 = 77.5946;
/// Radius in kilometres used when a query omits `radius`
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_STATUS_LEN: usize = 20;

/// Validation failures for issue payloads and queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IssueValidationError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid category. Must be one of: roads, water, garbage, lighting, safety, obstructions")]
    InvalidCategory,

    #[error("Coordinates out of valid range (-90 to 90 lat, -180 to 180 lng)")]
    CoordinatesOutOfRange,

    #[error("Invalid coordinates")]
    InvalidCoordinates,

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Title must be at most 200 characters long")]
    TitleTooLong,

    #[error("Invalid parameters")]
    InvalidParameters,

    #[error("Invalid field types")]
    InvalidFieldTypes,
}

/// Kind of civic problem being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Roads,
    Water,
    Garbage,
    Lighting,
    Safety,
    Obstructions,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 6] = [
        IssueCategory::Roads,
        IssueCategory::Water,
        IssueCategory::Garbage,
        IssueCategory::Lighting,
        IssueCategory::Safety,
        IssueCategory::Obstructions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Roads => "roads",
            IssueCategory::Water => "water",
            IssueCategory::Garbage => "garbage",
            IssueCategory::Lighting => "lighting",
            IssueCategory::Safety => "safety",
            IssueCategory::Obstructions => "obstructions",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueCategory {
    type Err = IssueValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or(IssueValidationError::InvalidCategory)
    }
}

/// A latitude/longitude pair known to be within geographic bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, IssueValidationError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(IssueValidationError::CoordinatesOutOfRange);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Issue as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub latitude: f64,
    pub longitude: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
}

/// Validated issue ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub coordinates: Coordinates,
    pub user_id: Option<Uuid>,
}

/// A coordinate sent either as a JSON number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CoordinateInput {
    Number(f64),
    Text(String),
}

impl CoordinateInput {
    fn value(&self) -> Result<f64, IssueValidationError> {
        match self {
            CoordinateInput::Number(value) => Ok(*value),
            CoordinateInput::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| IssueValidationError::InvalidCoordinates),
        }
    }
}

/// Request body for `POST /api/issues`
///
/// Every field is optional at the serde level so that a missing field maps
/// to a single "missing required fields" error instead of a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateIssueRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub latitude: Option<CoordinateInput>,
    pub longitude: Option<CoordinateInput>,
    pub user_id: Option<Uuid>,
}

impl CreateIssueRequest {
    /// Read a request from an arbitrary JSON body
    ///
    /// `null` and other non-object bodies carry no fields at all, so they are
    /// reported as missing fields like an empty object.
    pub fn from_json(body: serde_json::Value) -> Result<Self, IssueValidationError> {
        if !body.is_object() {
            return Err(IssueValidationError::MissingFields);
        }
        serde_json::from_value(body).map_err(|_| IssueValidationError::InvalidFieldTypes)
    }

    /// Validate the payload; `reporter` is used when the body names no user
    pub fn into_new_issue(self, reporter: Option<Uuid>) -> Result<NewIssue, IssueValidationError> {
        let (Some(title), Some(description), Some(category), Some(latitude), Some(longitude)) = (
            self.title,
            self.description,
            self.category,
            self.latitude,
            self.longitude,
        ) else {
            return Err(IssueValidationError::MissingFields);
        };

        let coordinates = Coordinates::new(latitude.value()?, longitude.value()?)?;
        let category = category.parse()?;

        if title.trim().is_empty() {
            return Err(IssueValidationError::EmptyTitle);
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(IssueValidationError::TitleTooLong);
        }

        Ok(NewIssue {
            title,
            description,
            category,
            coordinates,
            user_id: self.user_id.or(reporter),
        })
    }
}

/// Query string for `GET /api/issues`
///
/// Numbers arrive as raw strings so that parse failures surface as a 400 with
/// the API's JSON error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    /// Kilometres
    pub radius: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
}

/// Validated radius query
#[derive(Debug, Clone, PartialEq)]
pub struct IssueFilter {
    pub center: Coordinates,
    pub radius_meters: f64,
    pub status: Option<String>,
    pub category: Option<IssueCategory>,
}

impl IssueQuery {
    pub fn into_filter(self) -> Result<IssueFilter, IssueValidationError> {
        let lat = parse_number(self.lat.as_deref(), DEFAULT_LATITUDE)?;
        let lng = parse_number(self.lng.as_deref(), DEFAULT_LONGITUDE)?;
        let radius_km = parse_number(self.radius.as_deref(), DEFAULT_RADIUS_KM)?;

        let center =
            Coordinates::new(lat, lng).map_err(|_| IssueValidationError::InvalidParameters)?;
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(IssueValidationError::InvalidParameters);
        }

        let status = self.status.filter(|s| !s.is_empty());
        if status.as_ref().is_some_and(|s| s.chars().count() > MAX_STATUS_LEN) {
            return Err(IssueValidationError::InvalidParameters);
        }
        let category = self
            .category
            .filter(|c| !c.is_empty())
            .map(|c| c.parse())
            .transpose()?;

        Ok(IssueFilter {
            center,
            radius_meters: radius_km * 1000.0,
            status,
            category,
        })
    }
}

fn parse_number(raw: Option<&str>, default: f64) -> Result<f64, IssueValidationError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| IssueValidationError::InvalidParameters),
    }
}

//! # Daily Results
//!
//! One simulated day's outcome and the pure transforms consumed downstream:
//! KPI summary, flat persistence record and point-feature collection.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// ENUMS
// =============================================================================

/// Kind of discrete occurrence. Only shots are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Shot,
}

impl EventType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Shot => "shot",
        }
    }
}

/// Outcome of a single shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotStatus {
    Executed,
    Repeated,
}

impl ShotStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Executed => "executed",
            Self::Repeated => "repeated",
        }
    }
}

/// Day-level weather outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherState {
    Clear,
    WeatherDelay,
}

impl WeatherState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::WeatherDelay => "weather-delay",
        }
    }
}

impl std::fmt::Display for WeatherState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// A single timestamped, positioned occurrence within a workday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    pub event_time: NaiveDateTime,
    pub event_type: EventType,
    pub longitude: f64,
    pub latitude: f64,
    pub source_id: Option<String>,
    pub status: ShotStatus,
    /// Free-form extras; the engine writes `sequence` and `crew`.
    pub attributes: BTreeMap<String, Value>,
}

impl SimulationEvent {
    /// 1-based position of the event within its day.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.attributes.get("sequence").and_then(Value::as_u64)
    }

    /// 1-based crew number that fired the shot.
    #[must_use]
    pub fn crew(&self) -> Option<u64> {
        self.attributes.get("crew").and_then(Value::as_u64)
    }

    #[must_use]
    pub fn to_feature(&self) -> Feature {
        let mut properties = Map::new();
        properties.insert("event_type".into(), self.event_type.as_str().into());
        properties.insert("event_time".into(), iso_datetime(&self.event_time).into());
        properties.insert(
            "source_id".into(),
            self.source_id.clone().map_or(Value::Null, Value::String),
        );
        properties.insert("status".into(), self.status.as_str().into());
        for (key, value) in &self.attributes {
            properties.insert(key.clone(), value.clone());
        }

        Feature::point(self.longitude, self.latitude, properties)
    }
}

/// ISO-8601 timestamp; fractional seconds appear only when non-zero, with
/// microsecond precision.
#[must_use]
pub fn iso_datetime(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

// =============================================================================
// FEATURE COLLECTION
// =============================================================================

/// GeoJSON point geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

/// GeoJSON feature with a point geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: PointGeometry,
    pub properties: Map<String, Value>,
}

impl Feature {
    #[must_use]
    pub fn point(longitude: f64, latitude: f64, properties: Map<String, Value>) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry: PointGeometry {
                kind: "Point".to_string(),
                coordinates: [longitude, latitude],
            },
            properties,
        }
    }
}

/// GeoJSON feature collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    #[must_use]
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}

// =============================================================================
// DAILY RESULT
// =============================================================================

/// Aggregated outcome of one simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySimulationResult {
    pub date: NaiveDate,
    pub planned_shots: u32,
    pub executed_shots: u32,
    pub planned_receivers: u32,
    pub active_receivers: u32,
    pub uptime_ratio: f64,
    pub weather_state: WeatherState,
    pub events: Vec<SimulationEvent>,
}

/// KPI summary of a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyKpis {
    pub date: String,
    pub executed_shots: u32,
    pub active_receivers: u32,
    pub uptime_ratio: f64,
    pub weather_state: WeatherState,
}

/// Flat per-day row for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub project_id: i64,
    pub production_date: String,
    pub planned_shots: u32,
    pub executed_shots: u32,
    pub planned_receivers: u32,
    pub active_receivers: u32,
    pub uptime_ratio: f64,
    pub weather_code: WeatherState,
}

impl DailySimulationResult {
    #[must_use]
    pub fn kpis(&self) -> DailyKpis {
        DailyKpis {
            date: self.date.to_string(),
            executed_shots: self.executed_shots,
            active_receivers: self.active_receivers,
            uptime_ratio: round_to(self.uptime_ratio, 3),
            weather_state: self.weather_state,
        }
    }

    #[must_use]
    pub fn to_daily_record(&self, project_id: i64) -> DailyRecord {
        DailyRecord {
            project_id,
            production_date: self.date.to_string(),
            planned_shots: self.planned_shots,
            executed_shots: self.executed_shots,
            planned_receivers: self.planned_receivers,
            active_receivers: self.active_receivers,
            uptime_ratio: self.uptime_ratio,
            weather_code: self.weather_state,
        }
    }

    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection::new(self.events.iter().map(SimulationEvent::to_feature).collect())
    }

    /// Executed shots as a percentage of plan; 0 when nothing was planned.
    #[must_use]
    pub fn shot_completion_pct(&self) -> f64 {
        percentage(self.executed_shots, self.planned_shots)
    }

    #[must_use]
    pub fn receiver_completion_pct(&self) -> f64 {
        percentage(self.active_receivers, self.planned_receivers)
    }

    pub fn repeated_shots(&self) -> usize {
        self.events
            .iter()
            .filter(|e| e.status == ShotStatus::Repeated)
            .count()
    }
}

fn percentage(actual: u32, planned: u32) -> f64 {
    if planned == 0 {
        0.0
    } else {
        f64::from(actual) / f64::from(planned) * 100.0
    }
}

/// Round half to even at `digits` decimal places.
#[must_use]
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round_ties_even() / scale
}

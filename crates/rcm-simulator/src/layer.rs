//! Point-layer export of simulated events.
//!
//! Flattens a range of daily results into one record per event, carrying the
//! fixed property set a map layer is built from, plus the categorical status
//! styling applied to that layer.

use std::collections::BTreeMap;

use rcm_domain::results::iso_datetime;
use rcm_domain::{DailySimulationResult, Feature, FeatureCollection};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property keys of every exported point, in layer field order.
pub const LAYER_FIELDS: [&str; 7] = [
    "event_time",
    "day",
    "event_type",
    "source_id",
    "status",
    "crew",
    "sequence",
];

/// Styling categories keyed on `status`.
///
/// `weather-delay` is a day-level weather state and never an event status,
/// so points are only ever drawn in the first two categories.
pub const STATUS_CATEGORIES: [&str; 3] = ["executed", "repeated", "weather-delay"];

/// Fill color for a status category.
#[must_use]
pub fn status_color(status: &str) -> Option<&'static str> {
    match status {
        "executed" => Some("#00b894"),
        "repeated" => Some("#d63031"),
        "weather-delay" => Some("#0984e3"),
        _ => None,
    }
}

/// Attribute row of one exported point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_time: String,
    pub day: String,
    pub event_type: String,
    /// Empty when the shot had no assigned source.
    pub source_id: String,
    pub status: String,
    pub crew: Option<u64>,
    pub sequence: Option<u64>,
}

impl EventRecord {
    fn to_properties(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        properties.insert("event_time".into(), self.event_time.clone().into());
        properties.insert("day".into(), self.day.clone().into());
        properties.insert("event_type".into(), self.event_type.clone().into());
        properties.insert("source_id".into(), self.source_id.clone().into());
        properties.insert("status".into(), self.status.clone().into());
        properties.insert("crew".into(), self.crew.into());
        properties.insert("sequence".into(), self.sequence.into());
        properties
    }
}

/// One exported point: geometry plus attribute row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub longitude: f64,
    pub latitude: f64,
    pub properties: EventRecord,
}

/// Flatten every event of every day, preserving day then event order.
#[must_use]
pub fn flatten_results(results: &[DailySimulationResult]) -> Vec<PointRecord> {
    results
        .iter()
        .flat_map(|daily| {
            let day = daily.date.to_string();
            daily.events.iter().map(move |event| PointRecord {
                longitude: event.longitude,
                latitude: event.latitude,
                properties: EventRecord {
                    event_time: iso_datetime(&event.event_time),
                    day: day.clone(),
                    event_type: event.event_type.as_str().to_string(),
                    source_id: event.source_id.clone().unwrap_or_default(),
                    status: event.status.as_str().to_string(),
                    crew: event.crew(),
                    sequence: event.sequence(),
                },
            })
        })
        .collect()
}

/// Whole range as a single feature collection with [`LAYER_FIELDS`] properties.
#[must_use]
pub fn range_feature_collection(results: &[DailySimulationResult]) -> FeatureCollection {
    FeatureCollection::new(
        flatten_results(results)
            .iter()
            .map(|point| Feature::point(point.longitude, point.latitude, point.properties.to_properties()))
            .collect(),
    )
}

/// Point count per styling category; categories with no points report 0.
#[must_use]
pub fn status_counts(points: &[PointRecord]) -> BTreeMap<&'static str, usize> {
    let mut counts: BTreeMap<&'static str, usize> =
        STATUS_CATEGORIES.iter().map(|status| (*status, 0)).collect();
    for point in points {
        if let Some(count) = counts.get_mut(point.properties.status.as_str()) {
            *count += 1;
        }
    }
    counts
}

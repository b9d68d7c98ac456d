//! # Survey Configuration
//!
//! Validated, immutable description of a survey project: metadata, boundary
//! ring, source/receiver inventories and the operational parameters that
//! drive the production model.
//!
//! Documents are deserialized into a permissive raw shape first and then
//! checked field by field, so a rejected document reports the path of the
//! value that failed instead of a generic parse error.

use std::io::Read;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::error::ConfigValidationError;

type Validated<T> = std::result::Result<T, ConfigValidationError>;

// =============================================================================
// ENTITIES
// =============================================================================

/// High-level information about the seismic project. Descriptive only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    pub location: String,
    pub timezone: String,
    pub operator: Option<String>,
    pub description: Option<String>,
}

/// Survey area outline as an ordered `[lon, lat]` ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectBoundary {
    pub name: String,
    pub coordinates: Vec<[f64; 2]>,
    pub crs: String,
}

/// Nominal shot origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePoint {
    pub source_id: String,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Informational; the production model never reads it.
    pub nominal_shots_per_day: i64,
}

impl SourcePoint {
    #[must_use]
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Receiver node deployment site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverPoint {
    pub receiver_id: String,
    pub line_id: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub elevation_m: Option<f64>,
}

impl ReceiverPoint {
    #[must_use]
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Operational parameters of the production model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub daily_shot_target: u32,
    pub daily_receiver_target: u32,
    pub crew_count: u32,
    pub hours_per_day: f64,
    pub shots_per_crew_hour: f64,
    pub receiver_capacity_per_crew: u32,
    pub weather_downtime_probability: f64,
    pub max_weather_delay_hours: f64,
    pub equipment_failure_rate: f64,
    pub ambient_noise_factor: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            daily_shot_target: 1200,
            daily_receiver_target: 900,
            crew_count: 3,
            hours_per_day: 12.0,
            shots_per_crew_hour: 40.0,
            receiver_capacity_per_crew: 300,
            weather_downtime_probability: 0.15,
            max_weather_delay_hours: 4.0,
            equipment_failure_rate: 0.05,
            ambient_noise_factor: 0.05,
        }
    }
}

impl SimulationParameters {
    /// Shots the whole crew can fire in a full, undisturbed workday.
    #[must_use]
    pub fn crew_shot_capacity(&self) -> f64 {
        f64::from(self.crew_count) * self.shots_per_crew_hour * self.hours_per_day
    }

    /// Receivers the whole crew can keep active in a day.
    #[must_use]
    pub fn crew_receiver_capacity(&self) -> u64 {
        u64::from(self.crew_count) * u64::from(self.receiver_capacity_per_crew)
    }
}

/// Aggregate root for one simulation run.
///
/// Only obtainable through [`SimulationConfig::from_document`] (or serde,
/// which routes through the same validation), so every instance satisfies
/// all range constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSimulationConfig")]
pub struct SimulationConfig {
    project: ProjectMetadata,
    boundary: ProjectBoundary,
    sources: Vec<SourcePoint>,
    receivers: Vec<ReceiverPoint>,
    parameters: SimulationParameters,
}

impl SimulationConfig {
    /// Parse and validate a structured document.
    pub fn from_document(data: &serde_json::Value) -> Validated<Self> {
        RawSimulationConfig::deserialize(data)?.validate()
    }

    /// Parse JSON text, then validate it like [`Self::from_document`].
    pub fn from_json_str(text: &str) -> Validated<Self> {
        let raw: RawSimulationConfig = serde_json::from_str(text)?;
        raw.validate()
    }

    /// Validate a JSON document read from `reader`.
    pub fn from_reader(reader: impl Read) -> Validated<Self> {
        let raw: RawSimulationConfig = serde_json::from_reader(reader)?;
        raw.validate()
    }

    pub fn project(&self) -> &ProjectMetadata {
        &self.project
    }

    pub fn boundary(&self) -> &ProjectBoundary {
        &self.boundary
    }

    pub fn sources(&self) -> &[SourcePoint] {
        &self.sources
    }

    pub fn receivers(&self) -> &[ReceiverPoint] {
        &self.receivers
    }

    pub fn parameters(&self) -> &SimulationParameters {
        &self.parameters
    }

    #[must_use]
    pub fn source_points(&self) -> Vec<Point<f64>> {
        self.sources.iter().map(SourcePoint::to_point).collect()
    }

    #[must_use]
    pub fn receiver_points(&self) -> Vec<Point<f64>> {
        self.receivers.iter().map(ReceiverPoint::to_point).collect()
    }
}

// =============================================================================
// RAW DOCUMENT SHAPE
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawSimulationConfig {
    project: Option<RawProject>,
    boundary: Option<RawBoundary>,
    sources: Option<Vec<RawSource>>,
    receivers: Option<Vec<RawReceiver>>,
    parameters: Option<RawParameters>,
}

#[derive(Debug, Deserialize)]
struct RawProject {
    name: Option<String>,
    location: Option<String>,
    timezone: Option<String>,
    operator: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBoundary {
    name: Option<String>,
    coordinates: Option<Vec<Vec<f64>>>,
    crs: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    source_id: Option<String>,
    name: Option<String>,
    longitude: Option<f64>,
    latitude: Option<f64>,
    nominal_shots_per_day: Option<WholeNumber>,
}

#[derive(Debug, Deserialize)]
struct RawReceiver {
    receiver_id: Option<String>,
    line_id: Option<String>,
    longitude: Option<f64>,
    latitude: Option<f64>,
    elevation_m: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawParameters {
    daily_shot_target: Option<WholeNumber>,
    daily_receiver_target: Option<WholeNumber>,
    crew_count: Option<WholeNumber>,
    hours_per_day: Option<f64>,
    shots_per_crew_hour: Option<f64>,
    receiver_capacity_per_crew: Option<WholeNumber>,
    weather_downtime_probability: Option<f64>,
    max_weather_delay_hours: Option<f64>,
    equipment_failure_rate: Option<f64>,
    ambient_noise_factor: Option<f64>,
}

/// Integer field that also accepts integral floats such as `3.0`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum WholeNumber {
    Int(i64),
    Float(f64),
}

impl WholeNumber {
    #[allow(clippy::cast_possible_truncation)]
    fn value(self, field: &str) -> Validated<i64> {
        match self {
            Self::Int(v) => Ok(v),
            Self::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Ok(v as i64),
            Self::Float(v) => Err(ConfigValidationError::InvalidValue {
                field: field.to_string(),
                reason: format!("expected a whole number, got {v}"),
            }),
        }
    }
}

impl TryFrom<RawSimulationConfig> for SimulationConfig {
    type Error = ConfigValidationError;

    fn try_from(raw: RawSimulationConfig) -> Validated<Self> {
        raw.validate()
    }
}

impl RawSimulationConfig {
    fn validate(self) -> Validated<SimulationConfig> {
        let project = required(self.project, "project")?.validate()?;
        let boundary = required(self.boundary, "boundary")?.validate()?;

        let sources = required(self.sources, "sources")?
            .into_iter()
            .enumerate()
            .map(|(idx, source)| source.validate(&format!("sources[{idx}]")))
            .collect::<Validated<Vec<_>>>()?;

        let receivers = required(self.receivers, "receivers")?
            .into_iter()
            .enumerate()
            .map(|(idx, receiver)| receiver.validate(&format!("receivers[{idx}]")))
            .collect::<Validated<Vec<_>>>()?;

        let parameters = required(self.parameters, "parameters")?.validate()?;

        Ok(SimulationConfig {
            project,
            boundary,
            sources,
            receivers,
            parameters,
        })
    }
}

impl RawProject {
    fn validate(self) -> Validated<ProjectMetadata> {
        Ok(ProjectMetadata {
            name: required(self.name, "project.name")?,
            location: required(self.location, "project.location")?,
            timezone: self.timezone.unwrap_or_else(|| "UTC".to_string()),
            operator: self.operator,
            description: self.description,
        })
    }
}

impl RawBoundary {
    fn validate(self) -> Validated<ProjectBoundary> {
        let coordinates = required(self.coordinates, "boundary.coordinates")?
            .into_iter()
            .enumerate()
            .map(|(idx, pair)| match pair.as_slice() {
                // A trailing z value is tolerated and dropped.
                [lon, lat] | [lon, lat, _] => Ok([*lon, *lat]),
                _ => Err(ConfigValidationError::InvalidValue {
                    field: format!("boundary.coordinates[{idx}]"),
                    reason: format!("expected a [lon, lat] pair, got {} values", pair.len()),
                }),
            })
            .collect::<Validated<Vec<_>>>()?;

        Ok(ProjectBoundary {
            name: self.name.unwrap_or_else(|| "Project Area".to_string()),
            coordinates,
            crs: self.crs.unwrap_or_else(|| "EPSG:4326".to_string()),
        })
    }
}

impl RawSource {
    fn validate(self, path: &str) -> Validated<SourcePoint> {
        let source_id = required(self.source_id, &format!("{path}.source_id"))?;
        let name = required(self.name, &format!("{path}.name"))?;
        let (longitude, latitude) = position(self.longitude, self.latitude, path)?;
        let nominal_shots_per_day = self
            .nominal_shots_per_day
            .map(|v| v.value(&format!("{path}.nominal_shots_per_day")))
            .transpose()?
            .unwrap_or(50);

        Ok(SourcePoint {
            source_id,
            name,
            longitude,
            latitude,
            nominal_shots_per_day,
        })
    }
}

impl RawReceiver {
    fn validate(self, path: &str) -> Validated<ReceiverPoint> {
        let receiver_id = required(self.receiver_id, &format!("{path}.receiver_id"))?;
        let (longitude, latitude) = position(self.longitude, self.latitude, path)?;

        Ok(ReceiverPoint {
            receiver_id,
            line_id: self.line_id,
            longitude,
            latitude,
            elevation_m: self.elevation_m,
        })
    }
}

impl RawParameters {
    fn validate(self) -> Validated<SimulationParameters> {
        let defaults = SimulationParameters::default();

        let int = |value: Option<WholeNumber>, field: &str, fallback: u32| {
            let field = format!("parameters.{field}");
            value
                .map(|v| v.value(&field).and_then(|v| non_negative_int(v, &field)))
                .transpose()
                .map(|v| v.unwrap_or(fallback))
        };

        let crew_count = int(self.crew_count, "crew_count", defaults.crew_count)?;
        if crew_count < 1 {
            return Err(ConfigValidationError::out_of_range(
                "parameters.crew_count",
                f64::from(crew_count),
                ">= 1",
            ));
        }

        Ok(SimulationParameters {
            daily_shot_target: int(
                self.daily_shot_target,
                "daily_shot_target",
                defaults.daily_shot_target,
            )?,
            daily_receiver_target: int(
                self.daily_receiver_target,
                "daily_receiver_target",
                defaults.daily_receiver_target,
            )?,
            crew_count,
            hours_per_day: workday_hours(
                self.hours_per_day.unwrap_or(defaults.hours_per_day),
                "parameters.hours_per_day",
            )?,
            shots_per_crew_hour: positive(
                self.shots_per_crew_hour.unwrap_or(defaults.shots_per_crew_hour),
                "parameters.shots_per_crew_hour",
            )?,
            receiver_capacity_per_crew: int(
                self.receiver_capacity_per_crew,
                "receiver_capacity_per_crew",
                defaults.receiver_capacity_per_crew,
            )?,
            weather_downtime_probability: within(
                self.weather_downtime_probability
                    .unwrap_or(defaults.weather_downtime_probability),
                "parameters.weather_downtime_probability",
                0.0,
                1.0,
                "0 <= value <= 1",
            )?,
            max_weather_delay_hours: within(
                self.max_weather_delay_hours
                    .unwrap_or(defaults.max_weather_delay_hours),
                "parameters.max_weather_delay_hours",
                0.0,
                f64::MAX,
                ">= 0",
            )?,
            equipment_failure_rate: within(
                self.equipment_failure_rate
                    .unwrap_or(defaults.equipment_failure_rate),
                "parameters.equipment_failure_rate",
                0.0,
                0.5,
                "0 <= value <= 0.5",
            )?,
            ambient_noise_factor: within(
                self.ambient_noise_factor
                    .unwrap_or(defaults.ambient_noise_factor),
                "parameters.ambient_noise_factor",
                0.0,
                1.0,
                "0 <= value <= 1",
            )?,
        })
    }
}

// =============================================================================
// FIELD CHECKS
// =============================================================================

fn required<T>(value: Option<T>, field: &str) -> Validated<T> {
    value.ok_or_else(|| ConfigValidationError::missing(field))
}

fn within(value: f64, field: &str, min: f64, max: f64, constraint: &'static str) -> Validated<f64> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigValidationError::out_of_range(field, value, constraint))
    }
}

fn positive(value: f64, field: &str) -> Validated<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigValidationError::out_of_range(field, value, "> 0"))
    }
}

/// A workday is positive and fits in one calendar day.
fn workday_hours(value: f64, field: &str) -> Validated<f64> {
    if value > 0.0 && value <= 24.0 {
        Ok(value)
    } else {
        Err(ConfigValidationError::out_of_range(field, value, "0 < value <= 24"))
    }
}

#[allow(clippy::cast_precision_loss)]
fn non_negative_int(value: i64, field: &str) -> Validated<u32> {
    u32::try_from(value)
        .map_err(|_| ConfigValidationError::out_of_range(field, value as f64, "0 <= value <= 4294967295"))
}

fn position(longitude: Option<f64>, latitude: Option<f64>, path: &str) -> Validated<(f64, f64)> {
    let lon_field = format!("{path}.longitude");
    let lat_field = format!("{path}.latitude");
    let longitude = within(
        required(longitude, &lon_field)?,
        &lon_field,
        -180.0,
        180.0,
        "-180 <= longitude <= 180",
    )?;
    let latitude = within(
        required(latitude, &lat_field)?,
        &lat_field,
        -90.0,
        90.0,
        "-90 <= latitude <= 90",
    )?;
    Ok((longitude, latitude))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::address::en::CityName;
    use fake::faker::lorem::en::Word;
    use fake::Fake;
    use serde_json::json;

    fn document() -> serde_json::Value {
        json!({
            "project": { "name": "Birba 3D", "location": "Block 6, Oman" },
            "boundary": {
                "coordinates": [[56.0, 20.0], [56.2, 20.0], [56.2, 20.2], [56.0, 20.2], [56.0, 20.0]]
            },
            "sources": [
                { "source_id": "S-001", "name": "Vibe 1", "longitude": 56.05, "latitude": 20.05 }
            ],
            "receivers": [
                { "receiver_id": "R-001", "line_id": "L10", "longitude": 56.1, "latitude": 20.1 }
            ],
            "parameters": {}
        })
    }

    #[test]
    fn test_defaults_applied() {
        let config = SimulationConfig::from_document(&document()).unwrap();
        assert_eq!(config.project().timezone, "UTC");
        assert_eq!(config.boundary().name, "Project Area");
        assert_eq!(config.boundary().crs, "EPSG:4326");
        assert_eq!(config.sources()[0].nominal_shots_per_day, 50);
        assert_eq!(config.parameters(), &SimulationParameters::default());
    }

    #[test]
    fn test_missing_required_field_is_named() {
        let mut doc = document();
        doc["project"].as_object_mut().unwrap().remove("location");
        let err = SimulationConfig::from_document(&doc).unwrap_err();
        assert_eq!(err.field(), Some("project.location"));

        let mut doc = document();
        doc.as_object_mut().unwrap().remove("parameters");
        let err = SimulationConfig::from_document(&doc).unwrap_err();
        assert_eq!(err.field(), Some("parameters"));
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        let mut doc = document();
        doc["sources"][0]["latitude"] = json!(91.0);
        let err = SimulationConfig::from_document(&doc).unwrap_err();
        assert_eq!(err.field(), Some("sources[0].latitude"));

        let mut doc = document();
        doc["receivers"][0]["longitude"] = json!(-180.5);
        let err = SimulationConfig::from_document(&doc).unwrap_err();
        assert_eq!(err.field(), Some("receivers[0].longitude"));
    }

    #[test]
    fn test_parameter_ranges_rejected() {
        let cases = [
            ("weather_downtime_probability", json!(1.5)),
            ("equipment_failure_rate", json!(0.6)),
            ("ambient_noise_factor", json!(-0.1)),
            ("hours_per_day", json!(0.0)),
            ("hours_per_day", json!(24.5)),
            ("hours_per_day", json!(1.0e10)),
            ("shots_per_crew_hour", json!(-2.0)),
            ("crew_count", json!(0)),
            ("daily_shot_target", json!(-1)),
            ("max_weather_delay_hours", json!(-0.5)),
        ];

        for (field, value) in cases {
            let mut doc = document();
            doc["parameters"][field] = value;
            let err = SimulationConfig::from_document(&doc).unwrap_err();
            assert_eq!(err.field(), Some(format!("parameters.{field}").as_str()));
        }
    }

    #[test]
    fn test_malformed_coordinate_pair() {
        let mut doc = document();
        doc["boundary"]["coordinates"][1] = json!([56.2]);
        let err = SimulationConfig::from_document(&doc).unwrap_err();
        assert_eq!(err.field(), Some("boundary.coordinates[1]"));
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let mut doc = document();
        doc["parameters"]["crew_count"] = json!("three");
        let err = SimulationConfig::from_document(&doc).unwrap_err();
        assert!(matches!(err, ConfigValidationError::Malformed(_)));
    }

    #[test]
    fn test_integral_floats_accepted_for_counts() {
        let mut doc = document();
        doc["parameters"]["crew_count"] = json!(3.0);
        doc["parameters"]["daily_shot_target"] = json!(800.0);
        doc["sources"][0]["nominal_shots_per_day"] = json!(75.0);
        let config = SimulationConfig::from_document(&doc).unwrap();
        assert_eq!(config.parameters().crew_count, 3);
        assert_eq!(config.parameters().daily_shot_target, 800);
        assert_eq!(config.sources()[0].nominal_shots_per_day, 75);

        let mut doc = document();
        doc["parameters"]["crew_count"] = json!(2.5);
        let err = SimulationConfig::from_document(&doc).unwrap_err();
        assert_eq!(err.field(), Some("parameters.crew_count"));
    }

    #[test]
    fn test_nominal_shots_is_informational() {
        let mut doc = document();
        doc["sources"][0]["nominal_shots_per_day"] = json!(-10);
        let config = SimulationConfig::from_document(&doc).unwrap();
        assert_eq!(config.sources()[0].nominal_shots_per_day, -10);
    }

    #[test]
    fn test_full_day_workday_accepted() {
        let mut doc = document();
        doc["parameters"]["hours_per_day"] = json!(24.0);
        let config = SimulationConfig::from_document(&doc).unwrap();
        assert!((config.parameters().hours_per_day - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serde_routes_through_validation() {
        let mut doc = document();
        doc["parameters"]["crew_count"] = json!(0);
        assert!(serde_json::from_value::<SimulationConfig>(doc).is_err());

        let config: SimulationConfig = serde_json::from_value(document()).unwrap();
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(SimulationConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn test_inventory_points() {
        let mut doc = document();
        let sources: Vec<_> = (0..8)
            .map(|i| {
                json!({
                    "source_id": format!("S-{i:03}"),
                    "name": Word().fake::<String>(),
                    "longitude": (-180.0..180.0).fake::<f64>(),
                    "latitude": (-90.0..90.0).fake::<f64>(),
                })
            })
            .collect();
        doc["sources"] = json!(sources);
        doc["project"]["location"] = json!(CityName().fake::<String>());

        let config = SimulationConfig::from_document(&doc).unwrap();
        let points = config.source_points();
        assert_eq!(points.len(), 8);
        for (point, source) in points.iter().zip(config.sources()) {
            assert_eq!(point.x(), source.longitude);
            assert_eq!(point.y(), source.latitude);
        }
        assert_eq!(config.receiver_points()[0], Point::new(56.1, 20.1));
    }
}

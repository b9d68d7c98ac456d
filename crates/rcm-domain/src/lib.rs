//! # RCM Production - Domain Model
//!
//! Survey configuration, boundary geometry and daily result types for the
//! seismic production simulator. These types are shared by the engine, the
//! layer export and the reporting code.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod geometry;
pub mod results;

pub use config::{
    ProjectBoundary, ProjectMetadata, ReceiverPoint, SimulationConfig, SimulationParameters,
    SourcePoint,
};
pub use error::{ConfigValidationError, DomainError, GeometryError};
pub use geometry::SurveyArea;
pub use results::{
    DailyKpis, DailyRecord, DailySimulationResult, EventType, Feature, FeatureCollection,
    ShotStatus, SimulationEvent, WeatherState,
};

//! # RCM Production Simulator
//!
//! Deterministic daily production model for seismic survey crews.
//!
//! ## Features
//!
//! - Per-day seeded randomness: any day can be recomputed in isolation
//! - Weather, ambient and equipment degradation of crew output
//! - Timestamped, positioned shot events across the workday
//! - Point-layer export and range reports

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod layer;
pub mod reports;

pub use engine::SimulationEngine;
pub use error::SimulatorError;
pub use layer::{flatten_results, range_feature_collection, EventRecord, PointRecord};
pub use reports::RangeReport;

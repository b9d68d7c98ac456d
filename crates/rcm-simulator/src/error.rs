//! Simulator error types.

use rcm_domain::{ConfigValidationError, GeometryError};
use thiserror::Error;

/// Simulator errors.
///
/// Only construction can fail; a built engine never errors while simulating.
#[derive(Error, Debug)]
pub enum SimulatorError {
    /// Configuration document rejected
    #[error("Config error: {0}")]
    Config(#[from] ConfigValidationError),

    /// Boundary polygon unusable
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Report or export serialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SimulatorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for simulator operations.
pub type Result<T> = std::result::Result<T, SimulatorError>;

//! Domain error types

use thiserror::Error;

/// Raised while building a [`SimulationConfig`](crate::SimulationConfig) from a document.
///
/// The field path (`sources[2].latitude`, `parameters.crew_count`) identifies
/// the offending value whenever it is known.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Field {field} out of range: {value} (expected {constraint})")]
    OutOfRange {
        field: String,
        value: f64,
        constraint: &'static str,
    },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Malformed configuration document: {0}")]
    Malformed(String),
}

impl ConfigValidationError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub(crate) fn out_of_range(
        field: impl Into<String>,
        value: f64,
        constraint: &'static str,
    ) -> Self {
        Self::OutOfRange {
            field: field.into(),
            value,
            constraint,
        }
    }

    /// Path of the offending field, if the error names one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field }
            | Self::OutOfRange { field, .. }
            | Self::InvalidValue { field, .. } => Some(field),
            Self::Malformed(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Raised when the survey boundary cannot be turned into a valid polygon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("Boundary ring needs at least 3 distinct vertices, found {found}")]
    TooFewVertices { found: usize },

    #[error("Boundary ring encloses no area")]
    ZeroArea,

    #[error("Boundary still invalid after zero-distance repair: {reason}")]
    StillInvalid { reason: String },
}

/// Any failure while turning a document into a runnable survey.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Config(#[from] ConfigValidationError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

pub type Result<T> = std::result::Result<T, DomainError>;

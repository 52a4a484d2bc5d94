//! Error types for reservoir construction.

use mu_chem::ChemError;
use mu_phase::PhaseError;
use thiserror::Error;

pub type ReservoirResult<T> = Result<T, ReservoirError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReservoirError {
    #[error("Invalid condition '{token}': {reason}")]
    InvalidCondition { token: String, reason: String },

    #[error("Element {element} is not in {formula}")]
    ElementNotInComposition { element: String, formula: String },

    #[error("Duplicate reservoir key: {key}")]
    DuplicateKey { key: String },

    #[error("Invalid temperature: {value} K")]
    InvalidTemperature { value: f64 },

    #[error("Invalid pressure range ({low}, {high}): need 0 < low < high")]
    InvalidPressureRange { low: f64, high: f64 },

    #[error("Pressure grid needs at least one point")]
    InvalidPointCount,

    #[error("No precursors given")]
    EmptyPrecursorSet,

    #[error("Worker pool error: {message}")]
    ThreadPool { message: String },

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error(transparent)]
    Chem(#[from] ChemError),
}

impl ReservoirError {
    pub fn invalid_condition(token: &str, reason: impl Into<String>) -> Self {
        Self::InvalidCondition {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

//! Error and warning types for phase-stability analysis.

use mu_chem::{ChemError, Element};
use mu_hull::HullError;
use std::fmt;
use thiserror::Error;

pub type PhaseResult<T> = Result<T, PhaseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhaseError {
    /// Target is missing from the entries or lies above the hull.
    #[error("{formula} is not a stable phase{}", describe_e_above(.e_above_hull))]
    UnstablePhase {
        formula: String,
        e_above_hull: Option<f64>,
    },

    #[error("Invalid chemical system: {reason}")]
    InvalidChemicalSystem { reason: String },

    #[error("Element {element} is not in {formula}")]
    ElementNotInComposition { element: String, formula: String },

    #[error("Hull error: {0}")]
    Hull(#[from] HullError),

    #[error(transparent)]
    Chem(#[from] ChemError),
}

impl PhaseError {
    pub fn invalid_system(reason: impl Into<String>) -> Self {
        Self::InvalidChemicalSystem {
            reason: reason.into(),
        }
    }
}

fn describe_e_above(e_above_hull: &Option<f64>) -> String {
    match e_above_hull {
        Some(e) => format!(" ({e:.6} eV/atom above hull)"),
        None => " (no entry with this composition)".to_string(),
    }
}

/// Non-fatal conditions attached to a result.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseWarning {
    /// The open element's potential has zero range: low == high.
    DegenerateSystem { formula: String, element: Element },
}

impl fmt::Display for PhaseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateSystem { formula, element } => write!(
                f,
                "Degenerate stability interval for {element} in {formula}: low and high coincide"
            ),
        }
    }
}

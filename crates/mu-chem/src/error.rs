//! Chemistry-level errors.

use crate::store::ThermoType;
use mu_core::CoreError;
use thiserror::Error;

/// Result type for composition, entry and store operations.
pub type ChemResult<T> = Result<T, ChemError>;

/// Errors raised while parsing chemistry inputs or querying an entry store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChemError {
    /// Symbol is not on the periodic table.
    #[error("Unknown element symbol: '{symbol}'")]
    UnknownElement { symbol: String },

    /// Formula text could not be parsed.
    #[error("Invalid formula '{formula}': {reason}")]
    InvalidFormula { formula: String, reason: String },

    /// Stoichiometric amount is zero, negative or non-finite.
    #[error("Invalid amount {value} for element {element}")]
    InvalidAmount { element: String, value: f64 },

    /// A composition with no elements.
    #[error("Composition is empty")]
    EmptyComposition,

    /// The same element was given twice for a potential set.
    #[error("Duplicate element {element} in chemical potentials")]
    DuplicateElement { element: String },

    /// Two potential sets cover different elements.
    #[error("Chemical potentials cover different elements: [{left}] vs [{right}]")]
    MismatchedElements { left: String, right: String },

    /// The store has no energy for the requested composition.
    #[error("No reference energy for {formula} ({thermo_type})")]
    MissingReferenceEnergy {
        formula: String,
        thermo_type: ThermoType,
    },

    /// Opaque failure reported by an entry store backend.
    #[error("Database error: {message}")]
    Database { message: String },

    /// Thermo type label is not recognised.
    #[error("Unknown thermo type: '{0}'")]
    UnknownThermoType(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ChemError {
    pub fn invalid_formula(formula: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFormula {
            formula: formula.to_string(),
            reason: reason.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ChemError::UnknownElement {
            symbol: "Xx".into(),
        };
        assert!(err.to_string().contains("Xx"));

        let err = ChemError::MissingReferenceEnergy {
            formula: "BaO".into(),
            thermo_type: ThermoType::GgaGgaU,
        };
        let msg = err.to_string();
        assert!(msg.contains("BaO"));
        assert!(msg.contains("GGA_GGA+U"));
    }

    #[test]
    fn core_errors_pass_through() {
        let err: ChemError = CoreError::InvalidArg { what: "energy" }.into();
        assert!(err.to_string().contains("energy"));
    }
}

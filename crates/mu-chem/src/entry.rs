//! Thermodynamic entries supplied by an entry store.

use crate::composition::{ChemicalSystem, Composition};
use crate::error::{ChemError, ChemResult};
use mu_core::numeric::ensure_finite;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Immutable (composition, energy, source) triple.
///
/// `energy` is the total energy in eV of one formula unit of `composition`
/// as written, so `Ba2O2` at -24 eV and `BaO` at -12 eV describe the same
/// phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEntry")]
pub struct ThermoEntry {
    composition: Composition,
    energy: f64,
    source: String,
}

#[derive(Deserialize)]
struct RawEntry {
    composition: Composition,
    energy: f64,
    #[serde(default)]
    source: String,
}

impl TryFrom<RawEntry> for ThermoEntry {
    type Error = ChemError;

    fn try_from(raw: RawEntry) -> ChemResult<Self> {
        Self::new(raw.composition, raw.energy, raw.source)
    }
}

impl ThermoEntry {
    pub fn new(composition: Composition, energy: f64, source: impl Into<String>) -> ChemResult<Self> {
        ensure_finite(energy, "entry energy")?;
        Ok(Self {
            composition,
            energy,
            source: source.into(),
        })
    }

    /// Parse the formula and build an entry.
    pub fn from_formula(formula: &str, energy: f64, source: impl Into<String>) -> ChemResult<Self> {
        Self::new(formula.parse()?, energy, source)
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// Energy per formula unit [eV].
    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn energy_per_atom(&self) -> f64 {
        self.energy / self.composition.num_atoms()
    }

    /// Entry lies inside `system` (possibly in a subsystem of it).
    pub fn in_system(&self, system: &ChemicalSystem) -> bool {
        system.covers(&self.composition)
    }

    /// Ordering used wherever entries must be visited reproducibly:
    /// ascending energy per atom, then formula, then source id.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.energy_per_atom()
            .total_cmp(&other.energy_per_atom())
            .then_with(|| {
                self.composition
                    .reduced_formula()
                    .cmp(&other.composition.reduced_formula())
            })
            .then_with(|| self.source.cmp(&other.source))
    }
}

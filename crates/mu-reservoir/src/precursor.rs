//! Precursor assemblages buffering the non-oxygen potentials.

use crate::error::{ReservoirError, ReservoirResult};
use mu_chem::{ChemicalSystem, Composition, Element};

/// Precursor compositions with their energies [eV per formula unit].
///
/// One entry per reduced formula; the first occurrence wins.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecursorSet {
    items: Vec<(Composition, f64)>,
}

impl PrecursorSet {
    pub fn new<I>(energies: I) -> ReservoirResult<Self>
    where
        I: IntoIterator<Item = (Composition, f64)>,
    {
        let mut items: Vec<(Composition, f64)> = Vec::new();
        for (composition, energy) in energies {
            if items
                .iter()
                .any(|(c, _)| c.same_reduced(&composition, 1e-9))
            {
                tracing::debug!(formula = %composition, "duplicate precursor skipped");
                continue;
            }
            items.push((composition, energy));
        }
        if items.is_empty() {
            return Err(ReservoirError::EmptyPrecursorSet);
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[(Composition, f64)] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Chemical system spanned by all precursors.
    pub fn chemical_system(&self) -> ChemicalSystem {
        self.items
            .iter()
            .fold(ChemicalSystem::new([]), |acc, (c, _)| acc.union(&c.chemical_system()))
    }
}

/// Elements of `system` that no precursor contains, in formula order.
pub fn missing_elements(precursors: &[Composition], system: &ChemicalSystem) -> Vec<Element> {
    system
        .elements()
        .iter()
        .copied()
        .filter(|&e| !precursors.iter().any(|c| c.contains(e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comp(s: &str) -> Composition {
        s.parse().unwrap()
    }

    #[test]
    fn deduplicates_by_reduced_formula() {
        let set = PrecursorSet::new([
            (comp("BaO"), -12.0),
            (comp("Ba2O2"), -24.0),
            (comp("TiO2"), -27.0),
        ])
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.chemical_system().to_string(), "Ba-Ti-O");
    }

    #[test]
    fn empty_set_is_an_error() {
        assert!(matches!(
            PrecursorSet::new(Vec::new()),
            Err(ReservoirError::EmptyPrecursorSet)
        ));
    }

    #[test]
    fn reports_uncovered_elements() {
        let system = comp("SrTiO3").chemical_system();
        let missing = missing_elements(&[comp("TiO2")], &system);
        assert_eq!(missing, vec!["Sr".parse::<Element>().unwrap()]);
        assert!(missing_elements(&[comp("SrO"), comp("TiO2")], &system).is_empty());
    }
}

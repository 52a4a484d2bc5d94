//! Phase diagram: lower hull of entries restricted to one chemical system.

use crate::error::{PhaseError, PhaseResult};
use crate::interval::{StabilityInterval, select_bounds};
use mu_chem::{ChemicalSystem, Chempots, Composition, Element, ThermoEntry};
use mu_core::Tolerances;
use mu_hull::{Facet, HullError, HullPoint, LowerHull, lower_hull};

/// One hull facet: the phases in equilibrium and their potentials.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetEquilibrium {
    pub phases: Vec<String>,
    pub chempots: Chempots,
}

/// Entries of one chemical system and their lower convex hull.
///
/// Entries are held in canonical order (energy per atom, formula, source) so
/// that facet order, and every tie-break built on it, is reproducible.
#[derive(Debug, Clone)]
pub struct PhaseDiagram {
    system: ChemicalSystem,
    entries: Vec<ThermoEntry>,
    hull: LowerHull,
    tol: Tolerances,
}

impl PhaseDiagram {
    /// Build the diagram of `system` from `entries`; entries with elements
    /// outside `system` are ignored.
    #[tracing::instrument(skip(entries), fields(system = %system, n = entries.len()))]
    pub fn new(entries: &[ThermoEntry], system: &ChemicalSystem, tol: Tolerances) -> PhaseResult<Self> {
        if system.is_empty() {
            return Err(PhaseError::invalid_system("no elements"));
        }

        let mut entries: Vec<ThermoEntry> = entries
            .iter()
            .filter(|entry| entry.in_system(system))
            .cloned()
            .collect();
        entries.sort_by(ThermoEntry::canonical_cmp);

        let points: Vec<HullPoint> = entries
            .iter()
            .map(|entry| HullPoint::new(coords(system, entry.composition()), entry.energy_per_atom()))
            .collect();

        let hull = lower_hull(&points, tol).map_err(|err| match err {
            HullError::Empty => PhaseError::invalid_system(format!("no entries in {system}")),
            HullError::MissingCorner { component } => PhaseError::invalid_system(format!(
                "no elemental entry for {}",
                system.elements()[component]
            )),
            other => PhaseError::Hull(other),
        })?;

        tracing::debug!(
            entries = entries.len(),
            facets = hull.facets().len(),
            "phase diagram built"
        );
        Ok(Self {
            system: system.clone(),
            entries,
            hull,
            tol,
        })
    }

    pub fn system(&self) -> &ChemicalSystem {
        &self.system
    }

    /// Entries in canonical order.
    pub fn entries(&self) -> &[ThermoEntry] {
        &self.entries
    }

    pub fn tolerances(&self) -> Tolerances {
        self.tol
    }

    /// Entries on the hull, one per reduced composition.
    pub fn stable_entries(&self) -> Vec<&ThermoEntry> {
        let mut out: Vec<&ThermoEntry> = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if !self.hull.is_on_hull(index) {
                continue;
            }
            if out
                .iter()
                .any(|e| e.composition().same_reduced(entry.composition(), 1e-9))
            {
                continue;
            }
            out.push(entry);
        }
        out
    }

    /// Energy above the hull [eV/atom] of `entry`.
    pub fn energy_above_hull(&self, entry: &ThermoEntry) -> PhaseResult<f64> {
        self.check_covers(entry.composition())?;
        let point = HullPoint::new(coords(&self.system, entry.composition()), entry.energy_per_atom());
        Ok(self.hull.energy_above_hull(&point))
    }

    /// Potentials of every facet, in facet order.
    pub fn facet_chempots(&self) -> PhaseResult<Vec<FacetEquilibrium>> {
        self.hull
            .facets()
            .iter()
            .map(|facet| {
                Ok(FacetEquilibrium {
                    phases: self.phase_names(facet),
                    chempots: self.chempots_of(facet)?,
                })
            })
            .collect()
    }

    /// Stability interval of `target` with `open_element` as the free potential.
    #[tracing::instrument(skip(self), fields(formula = %target, open = %open_element))]
    pub fn stability_interval(
        &self,
        target: &Composition,
        open_element: Element,
    ) -> PhaseResult<StabilityInterval> {
        if !target.contains(open_element) {
            return Err(PhaseError::ElementNotInComposition {
                element: open_element.symbol().to_string(),
                formula: target.formula(),
            });
        }
        self.check_covers(target)?;
        let open_index = self
            .system
            .index_of(open_element)
            .ok_or_else(|| PhaseError::invalid_system(format!("{open_element} not in {}", self.system)))?;

        let index = self.target_index(target)?;
        let adjacent: Vec<&Facet> = self.hull.facets_containing(index).collect();
        let candidates: Vec<(Vec<f64>, Chempots)> = adjacent
            .iter()
            .map(|facet| Ok((facet.plane().to_vec(), self.chempots_of(facet)?)))
            .collect::<PhaseResult<_>>()?;

        let (low, high) = select_bounds(&candidates, open_index, self.tol.abs).ok_or_else(|| {
            PhaseError::invalid_system(format!("{} has no adjacent hull facets", target.formula()))
        })?;
        tracing::debug!(facets = adjacent.len(), "selected interval bounds");

        Ok(StabilityInterval::new(
            target.reduced().0,
            open_element,
            candidates[low].1.clone(),
            candidates[high].1.clone(),
            self.tol.abs,
        ))
    }

    /// Index of the entry representing `target`: the lowest canonical entry
    /// with the same reduced composition, which must be on the hull.
    fn target_index(&self, target: &Composition) -> PhaseResult<usize> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.composition().same_reduced(target, 1e-9))
            .ok_or_else(|| PhaseError::UnstablePhase {
                formula: target.reduced_formula(),
                e_above_hull: None,
            })?;

        if !self.hull.is_on_hull(index) {
            return Err(PhaseError::UnstablePhase {
                formula: target.reduced_formula(),
                e_above_hull: Some(self.energy_above_hull(&self.entries[index])?),
            });
        }
        Ok(index)
    }

    fn check_covers(&self, composition: &Composition) -> PhaseResult<()> {
        if self.system.covers(composition) {
            Ok(())
        } else {
            Err(PhaseError::invalid_system(format!(
                "{} is outside {}",
                composition.formula(),
                self.system
            )))
        }
    }

    fn chempots_of(&self, facet: &Facet) -> PhaseResult<Chempots> {
        let pairs = self.system.elements().iter().copied().zip(facet.plane().iter().copied());
        Ok(Chempots::from_pairs(pairs)?)
    }

    fn phase_names(&self, facet: &Facet) -> Vec<String> {
        let mut names: Vec<String> = facet
            .vertices()
            .iter()
            .map(|&v| self.entries[v].composition().reduced_formula())
            .collect();
        names.dedup();
        names
    }
}

fn coords(system: &ChemicalSystem, composition: &Composition) -> Vec<f64> {
    system
        .elements()
        .iter()
        .map(|&element| composition.fraction(element))
        .collect()
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn binary_oxide_interval_spans_both_elemental_limits(e in -20.0_f64..-7.5) {
            let entries: Vec<ThermoEntry> = [("Ba", -2.0), ("O2", -9.896), ("BaO", e)]
                .into_iter()
                .map(|(f, energy)| ThermoEntry::from_formula(f, energy, f).unwrap())
                .collect();
            let bao: Composition = "BaO".parse().unwrap();
            let diagram = PhaseDiagram::new(&entries, &bao.chemical_system(), Tolerances::hull()).unwrap();
            let interval = diagram.stability_interval(&bao, Element::O).unwrap();

            let (low, high) = interval.open_range();
            prop_assert!(low <= high);
            prop_assert!((low - (e + 2.0)).abs() < 1e-9);
            prop_assert!((high + 4.948).abs() < 1e-9);
            for mu in [interval.low(), interval.high()] {
                let sum = mu.get_symbol("Ba").unwrap() + mu.get(Element::O).unwrap();
                prop_assert!((sum - e).abs() < 1e-9);
            }
        }
    }
}

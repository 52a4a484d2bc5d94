//! Potentials of a phase assemblage with one element's potential held fixed.

use crate::error::{PhaseError, PhaseResult};
use mu_chem::{ChemicalSystem, Chempots, Composition, Element};
use mu_hull::{least_squares, solve_plane};
use nalgebra::{DMatrix, DVector};

/// Solve `Σ_j n_ij μ_j = E_i` for every phase `i`, with `μ_fixed` given.
///
/// `phases` are (composition, energy per formula unit) pairs that must all
/// lie on one supporting hyperplane. With as many phases as free elements
/// the system is solved exactly; extra phases are solved in the
/// least-squares sense and rejected when the largest residual exceeds
/// `residual_tol` [eV per formula unit], since they cannot coexist.
pub fn fixed_potential_equilibrium(
    phases: &[(Composition, f64)],
    fixed: (Element, f64),
    residual_tol: f64,
) -> PhaseResult<Chempots> {
    let (fixed_element, fixed_mu) = fixed;
    let system = phases
        .iter()
        .fold(ChemicalSystem::new([]), |acc, (c, _)| acc.union(&c.chemical_system()));
    if !system.contains(fixed_element) {
        return Err(PhaseError::invalid_system(format!(
            "no phase contains {fixed_element}"
        )));
    }

    let free: Vec<Element> = system
        .elements()
        .iter()
        .copied()
        .filter(|&e| e != fixed_element)
        .collect();
    if free.is_empty() {
        return Err(PhaseError::invalid_system(format!(
            "phases contain no element besides {fixed_element}"
        )));
    }
    if phases.len() < free.len() {
        return Err(PhaseError::invalid_system(format!(
            "{} phases cannot fix {} potentials in {system}",
            phases.len(),
            free.len()
        )));
    }

    let rows = DMatrix::from_fn(phases.len(), free.len(), |i, j| phases[i].0.amount(free[j]));
    let rhs = DVector::from_iterator(
        phases.len(),
        phases
            .iter()
            .map(|(c, energy)| energy - c.amount(fixed_element) * fixed_mu),
    );

    let solution = if phases.len() == free.len() {
        solve_plane(&rows, &rhs)
    } else {
        match least_squares(&rows, &rhs) {
            Some((solution, residual)) if residual <= residual_tol => Some(solution),
            Some((_, residual)) => {
                return Err(PhaseError::invalid_system(format!(
                    "phases cannot coexist at {fixed_element} = {fixed_mu}: residual {residual:.3e} eV"
                )));
            }
            None => None,
        }
    };
    let solution = solution.ok_or_else(|| {
        PhaseError::invalid_system(format!("phase compositions are linearly dependent in {system}"))
    })?;

    let pairs = free
        .iter()
        .copied()
        .zip(solution.iter().copied())
        .chain(std::iter::once((fixed_element, fixed_mu)));
    Ok(Chempots::from_pairs(pairs)?)
}

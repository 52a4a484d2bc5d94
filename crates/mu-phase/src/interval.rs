//! Stability intervals and bound selection.

use crate::error::PhaseWarning;
use mu_chem::{Chempots, Composition, Element};

/// Range of one element's potential over which a phase stays on the hull,
/// with the full potential set at each end.
///
/// Invariant: `low[open] <= high[open]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityInterval {
    target: Composition,
    open_element: Element,
    low: Chempots,
    high: Chempots,
    warnings: Vec<PhaseWarning>,
}

impl StabilityInterval {
    pub(crate) fn new(
        target: Composition,
        open_element: Element,
        low: Chempots,
        high: Chempots,
        tol: f64,
    ) -> Self {
        let mut interval = Self {
            target,
            open_element,
            low,
            high,
            warnings: Vec::new(),
        };
        if interval.width() <= tol {
            tracing::warn!(
                formula = %interval.target,
                element = %open_element,
                "zero-width stability interval"
            );
            interval.warnings.push(PhaseWarning::DegenerateSystem {
                formula: interval.target.formula(),
                element: open_element,
            });
        }
        interval
    }

    /// Reduced target composition.
    pub fn target(&self) -> &Composition {
        &self.target
    }

    pub fn open_element(&self) -> Element {
        self.open_element
    }

    /// Potentials at the lower bound of the open element ("poor").
    pub fn low(&self) -> &Chempots {
        &self.low
    }

    /// Potentials at the upper bound of the open element ("rich").
    pub fn high(&self) -> &Chempots {
        &self.high
    }

    pub fn warnings(&self) -> &[PhaseWarning] {
        &self.warnings
    }

    pub fn is_degenerate(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// `(low, high)` potential of the open element.
    pub fn open_range(&self) -> (f64, f64) {
        let low = self.low.get(self.open_element).unwrap_or(f64::NAN);
        let high = self.high.get(self.open_element).unwrap_or(f64::NAN);
        (low, high)
    }

    pub fn width(&self) -> f64 {
        let (low, high) = self.open_range();
        high - low
    }
}

/// Pick the (low, high) facets among `candidates` (plane coefficients plus
/// potentials, in canonical facet order).
///
/// Facets within `tol` of the extreme open-element potential tie; among tied
/// pairs the one with the smallest squared distance between the two
/// potential vectors wins, then the earliest in facet order.
pub(crate) fn select_bounds(
    candidates: &[(Vec<f64>, Chempots)],
    open_index: usize,
    tol: f64,
) -> Option<(usize, usize)> {
    let mu = |i: usize| candidates[i].0[open_index];
    let indices = 0..candidates.len();
    let min = indices.clone().map(mu).reduce(f64::min)?;
    let max = indices.clone().map(mu).reduce(f64::max)?;

    let lows: Vec<usize> = indices.clone().filter(|&i| mu(i) <= min + tol).collect();
    let highs: Vec<usize> = indices.filter(|&i| mu(i) >= max - tol).collect();

    let mut best: Option<(usize, usize, f64)> = None;
    for &l in &lows {
        for &h in &highs {
            let d = squared_distance(&candidates[l].0, &candidates[h].0);
            if best.is_none_or(|(_, _, current)| d < current) {
                best = Some((l, h, d));
            }
        }
    }
    best.map(|(l, h, _)| (l, h))
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

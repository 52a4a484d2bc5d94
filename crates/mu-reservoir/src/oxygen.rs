//! Oxygen chemical potential of an ideal O2 gas.

use mu_core::units::constants::{standard_pressure, thermal_energy_ev};
use mu_core::units::{Pressure, Temperature, kelvin_of, pressure_ratio};
use serde::{Deserialize, Serialize};

/// Standard-state correction Δμ_O(T, p°) [eV] of Reuter and Scheffler
/// (PRB 65, 035406), tabulated every 100 K.
const REUTER_SCHEFFLER: [(f64, f64); 11] = [
    (0.0, 0.0),
    (100.0, -0.08),
    (200.0, -0.17),
    (300.0, -0.27),
    (400.0, -0.38),
    (500.0, -0.50),
    (600.0, -0.61),
    (700.0, -0.73),
    (800.0, -0.85),
    (900.0, -0.98),
    (1000.0, -1.10),
];

/// Temperature correction added to the oxygen reference potential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OxygenCorrection {
    #[default]
    None,
    /// Linear interpolation in the Reuter-Scheffler table, extrapolated
    /// from the last segment above 1000 K.
    ReuterScheffler,
}

impl OxygenCorrection {
    pub fn delta_mu(&self, t: Temperature) -> f64 {
        match self {
            OxygenCorrection::None => 0.0,
            OxygenCorrection::ReuterScheffler => interpolate(&REUTER_SCHEFFLER, kelvin_of(t)),
        }
    }
}

fn interpolate(table: &[(f64, f64)], x: f64) -> f64 {
    let segment = table
        .windows(2)
        .find(|w| x <= w[1].0)
        .unwrap_or(&table[table.len() - 2..]);
    let (x0, y0) = segment[0];
    let (x1, y1) = segment[1];
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// μ_O(T, p) = μ_O,ref + Δμ_O(T) + ½ k_B T ln(p / p°).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OxygenModel {
    reference: f64,
    correction: OxygenCorrection,
}

impl OxygenModel {
    /// `reference` is μ_O at standard pressure [eV], typically half the O2
    /// energy per formula unit.
    pub fn new(reference: f64) -> Self {
        Self {
            reference,
            correction: OxygenCorrection::None,
        }
    }

    pub fn with_correction(mut self, correction: OxygenCorrection) -> Self {
        self.correction = correction;
        self
    }

    pub fn reference(&self) -> f64 {
        self.reference
    }

    pub fn correction(&self) -> OxygenCorrection {
        self.correction
    }

    pub fn chempot(&self, t: Temperature, p: Pressure) -> f64 {
        let ratio = pressure_ratio(p, standard_pressure());
        self.reference + self.correction.delta_mu(t) + 0.5 * thermal_energy_ev(t) * ratio.ln()
    }
}

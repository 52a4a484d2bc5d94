//! Oxygen-pressure reservoirs buffered by a precursor assemblage.

use crate::error::{ReservoirError, ReservoirResult};
use crate::grid::{PressureGrid, PressureRange};
use crate::oxygen::{OxygenCorrection, OxygenModel};
use crate::precursor::PrecursorSet;
use crate::reservoirs::{ReservoirKey, Reservoirs, build};
use mu_chem::{Chempots, Element};
use mu_core::units::{Temperature, atm, k, kelvin_of};
use mu_phase::fixed_potential_equilibrium;
use rayon::prelude::*;

/// Temperature used in place of exactly 0 K.
pub const TEMPERATURE_FLOOR_K: f64 = 0.1;

/// Largest residual [eV per formula unit] for an overdetermined precursor set.
pub const PRECURSOR_RESIDUAL_TOL: f64 = 1e-6;

/// Maps a pressure grid to potential sets, one solve per grid point.
#[derive(Debug, Clone)]
pub struct PressureReservoirEngine {
    max_workers: usize,
    correction: OxygenCorrection,
}

impl Default for PressureReservoirEngine {
    fn default() -> Self {
        Self {
            max_workers: std::thread::available_parallelism().map_or(1, |n| n.get()),
            correction: OxygenCorrection::None,
        }
    }
}

impl PressureReservoirEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Worker pool size; 0 is treated as 1.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_correction(mut self, correction: OxygenCorrection) -> Self {
        self.correction = correction;
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Reservoirs keyed by pressure [atm], ascending.
    ///
    /// The first failing grid point aborts the whole request.
    #[tracing::instrument(skip(self, precursors), fields(precursors = precursors.len()))]
    pub fn pressure_reservoirs(
        &self,
        precursors: &PrecursorSet,
        oxygen_ref: f64,
        temperature: Temperature,
        pressure_range: PressureRange,
        npoints: usize,
    ) -> ReservoirResult<Reservoirs> {
        let temperature = checked_temperature(temperature)?;
        let grid = PressureGrid::log_uniform(pressure_range, npoints)?;
        let model = OxygenModel::new(oxygen_ref).with_correction(self.correction);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ReservoirError::ThreadPool {
                message: e.to_string(),
            })?;

        let points: Vec<(ReservoirKey, Chempots)> = pool.install(|| {
            grid.points()
                .par_iter()
                .map(|&p| -> ReservoirResult<(ReservoirKey, Chempots)> {
                    let mu_o = model.chempot(temperature, atm(p));
                    let chempots = fixed_potential_equilibrium(
                        precursors.items(),
                        (Element::O, mu_o),
                        PRECURSOR_RESIDUAL_TOL,
                    )?;
                    Ok((ReservoirKey::Pressure(p), chempots))
                })
                .collect::<ReservoirResult<Vec<_>>>()
        })?;

        let reservoirs = build(points)?;
        tracing::info!(
            npoints = reservoirs.len(),
            temperature_k = kelvin_of(temperature),
            "pressure reservoirs built"
        );
        Ok(reservoirs)
    }
}

/// Reject negative or non-finite temperatures; floor exactly 0 K.
fn checked_temperature(temperature: Temperature) -> ReservoirResult<Temperature> {
    let kelvin = kelvin_of(temperature);
    if !kelvin.is_finite() || kelvin < 0.0 {
        return Err(ReservoirError::InvalidTemperature { value: kelvin });
    }
    if kelvin == 0.0 {
        tracing::warn!(floor_k = TEMPERATURE_FLOOR_K, "temperature of 0 K floored");
        return Ok(k(TEMPERATURE_FLOOR_K));
    }
    Ok(temperature)
}

//! Chemical-potential service shared by the CLI and library callers.
//!
//! Holds the settings and a stability engine whose interval cache lives as
//! long as the service, so repeated requests over the same entries reuse
//! their hull solves.

use crate::error::{AppError, AppResult};
use crate::settings::Settings;
use mu_chem::{
    CachedEntryStore, Chempots, Composition, Element, EntryStore, ThermoEntry, ThermoType,
    fetch_reference_energies,
};
use mu_core::Tolerances;
use mu_core::units::Temperature;
use mu_phase::{PhaseStabilityEngine, StabilityInterval};
use mu_reservoir::{
    Condition, PrecursorSet, PressureRange, PressureReservoirEngine, ReservoirError, Reservoirs,
    condition_reservoirs, default_element, missing_elements, resolve,
};
use serde::Serialize;
use std::sync::Arc;

/// Either one potential set (condition query) or the three-condition
/// reservoirs (element query).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChempotsOutcome {
    Single(Chempots),
    Reservoirs(Reservoirs),
}

/// Serializable view of a stability interval.
#[derive(Debug, Clone, Serialize)]
pub struct IntervalReport {
    pub target: String,
    pub open_element: Element,
    pub low: Chempots,
    pub high: Chempots,
    pub warnings: Vec<String>,
    pub tolerances: Tolerances,
}

impl IntervalReport {
    pub fn new(interval: &StabilityInterval, tolerances: Tolerances) -> Self {
        Self {
            target: interval.target().formula(),
            open_element: interval.open_element(),
            low: interval.low().clone(),
            high: interval.high().clone(),
            warnings: interval.warnings().iter().map(|w| w.to_string()).collect(),
            tolerances,
        }
    }
}

/// Store-backed oxygen-pressure request.
#[derive(Debug, Clone)]
pub struct PressureRequest {
    pub precursors: Vec<Composition>,
    pub temperature: Temperature,
    /// μ_O at standard pressure; fetched as half the O2 energy when `None`.
    pub oxygen_ref: Option<f64>,
    pub pressure_range: PressureRange,
    pub npoints: usize,
    pub thermo_type: ThermoType,
    /// System the reservoirs are meant for; elements no precursor covers are
    /// logged.
    pub target: Option<Composition>,
}

#[derive(Debug)]
pub struct ChempotService {
    settings: Settings,
    engine: PhaseStabilityEngine,
}

impl Default for ChempotService {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl ChempotService {
    pub fn new(settings: Settings) -> Self {
        let engine = PhaseStabilityEngine::new(settings.tolerances());
        Self { settings, engine }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engine(&self) -> &PhaseStabilityEngine {
        &self.engine
    }

    /// Defaults from the settings for a store-backed pressure request.
    pub fn pressure_request(&self, precursors: Vec<Composition>, temperature: Temperature) -> PressureRequest {
        PressureRequest {
            precursors,
            temperature,
            oxygen_ref: None,
            pressure_range: self.settings.pressure_range,
            npoints: self.settings.npoints,
            thermo_type: self.settings.thermo_type,
            target: None,
        }
    }

    pub fn stability_interval(
        &self,
        entries: &[ThermoEntry],
        target: &Composition,
        element: Element,
    ) -> AppResult<Arc<StabilityInterval>> {
        Ok(self.engine.stability_interval(entries, target, element)?)
    }

    /// Potentials for one `"<Element>-<qualifier>"` token.
    #[tracing::instrument(skip(self, entries), fields(formula = %target))]
    pub fn condition_chempots(
        &self,
        entries: &[ThermoEntry],
        target: &Composition,
        condition: &str,
    ) -> AppResult<Chempots> {
        let condition: Condition = condition.parse()?;
        condition.ensure_in(target)?;
        let interval = self.stability_interval(entries, target, condition.element)?;
        Ok(resolve(&interval, condition.qualifier)?)
    }

    /// `<el>-poor`, `<el>-middle`, `<el>-rich` for `element`, or for the
    /// default element when `None`.
    #[tracing::instrument(skip(self, entries), fields(formula = %target))]
    pub fn reservoirs_for_element(
        &self,
        entries: &[ThermoEntry],
        target: &Composition,
        element: Option<Element>,
    ) -> AppResult<Reservoirs> {
        let element = match element {
            Some(element) => element,
            None => default_element(target).ok_or_else(|| {
                AppError::InvalidInput(format!("{} has no elements", target.formula()))
            })?,
        };
        if !target.contains(element) {
            return Err(ReservoirError::ElementNotInComposition {
                element: element.symbol().to_string(),
                formula: target.formula(),
            }
            .into());
        }
        let interval = self.stability_interval(entries, target, element)?;
        let reservoirs = condition_reservoirs(&interval)?;
        tracing::info!(element = %element, "condition reservoirs built");
        Ok(reservoirs)
    }

    /// Oxygen-pressure reservoirs from precursor energies.
    pub fn pressure_reservoirs(
        &self,
        precursor_energies: &[(Composition, f64)],
        oxygen_ref: f64,
        temperature: Temperature,
        pressure_range: PressureRange,
        npoints: usize,
    ) -> AppResult<Reservoirs> {
        let precursors = PrecursorSet::new(precursor_energies.iter().cloned())?;
        Ok(self.pressure_engine().pressure_reservoirs(
            &precursors,
            oxygen_ref,
            temperature,
            pressure_range,
            npoints,
        )?)
    }

    /// Fetch the chemical system of `target` from `store` and resolve one
    /// condition.
    pub fn generate_chempots_from_condition<S: EntryStore + ?Sized>(
        &self,
        store: &S,
        target: &Composition,
        condition: &str,
        thermo_type: ThermoType,
    ) -> AppResult<Chempots> {
        let entries = store.entries_for_chemical_system(&target.chemical_system(), thermo_type)?;
        self.condition_chempots(&entries, target, condition)
    }

    /// A condition token gives one potential set; an element symbol (or
    /// `None`, for the default element) gives the three-condition reservoirs.
    pub fn generate_chempots<S: EntryStore + ?Sized>(
        &self,
        store: &S,
        target: &Composition,
        element_or_condition: Option<&str>,
        thermo_type: ThermoType,
    ) -> AppResult<ChempotsOutcome> {
        let entries = store.entries_for_chemical_system(&target.chemical_system(), thermo_type)?;
        match element_or_condition.map(str::trim) {
            Some(token) if token.contains('-') => Ok(ChempotsOutcome::Single(
                self.condition_chempots(&entries, target, token)?,
            )),
            Some(symbol) => {
                let element: Element = symbol.parse()?;
                Ok(ChempotsOutcome::Reservoirs(self.reservoirs_for_element(
                    &entries,
                    target,
                    Some(element),
                )?))
            }
            None => Ok(ChempotsOutcome::Reservoirs(
                self.reservoirs_for_element(&entries, target, None)?,
            )),
        }
    }

    /// Fetch every energy first (each distinct precursor once), then build
    /// the pressure reservoirs.
    #[tracing::instrument(skip(self, store, request), fields(precursors = request.precursors.len()))]
    pub fn generate_pressure_reservoirs_from_precursors<S: EntryStore + ?Sized>(
        &self,
        store: &S,
        request: &PressureRequest,
    ) -> AppResult<Reservoirs> {
        if request.precursors.is_empty() {
            return Err(ReservoirError::EmptyPrecursorSet.into());
        }
        if let Some(target) = &request.target {
            let missing = missing_elements(&request.precursors, &target.chemical_system());
            if !missing.is_empty() {
                let symbols: Vec<&str> = missing.iter().map(|e| e.symbol()).collect();
                tracing::warn!(
                    target_formula = %target,
                    missing = %symbols.join(", "),
                    "precursors do not cover every element"
                );
            }
        }

        let cached = CachedEntryStore::new(store);
        let oxygen_ref = match request.oxygen_ref {
            Some(value) => value,
            None => {
                let o2: Composition = "O2".parse()?;
                cached.reference_energy(&o2, request.thermo_type)? / 2.0
            }
        };
        let energies = fetch_reference_energies(&cached, &request.precursors, request.thermo_type)?;
        tracing::debug!(lookups = cached.misses(), "precursor energies fetched");

        self.pressure_reservoirs(
            &energies,
            oxygen_ref,
            request.temperature,
            request.pressure_range,
            request.npoints,
        )
    }

    fn pressure_engine(&self) -> PressureReservoirEngine {
        let engine = PressureReservoirEngine::new().with_correction(self.settings.oxygen_correction);
        match self.settings.max_workers {
            Some(n) => engine.with_max_workers(n),
            None => engine,
        }
    }
}

/// One condition token against default settings.
pub fn compute_condition_chempots(
    entries: &[ThermoEntry],
    target: &Composition,
    condition: &str,
) -> AppResult<Chempots> {
    ChempotService::default().condition_chempots(entries, target, condition)
}

/// Poor/middle/rich reservoirs against default settings.
pub fn compute_reservoirs_for_element(
    entries: &[ThermoEntry],
    target: &Composition,
    element: Option<Element>,
) -> AppResult<Reservoirs> {
    ChempotService::default().reservoirs_for_element(entries, target, element)
}

pub fn compute_pressure_reservoirs(
    precursor_energies: &[(Composition, f64)],
    oxygen_ref: f64,
    temperature: Temperature,
    pressure_range: PressureRange,
    npoints: usize,
) -> AppResult<Reservoirs> {
    ChempotService::default().pressure_reservoirs(
        precursor_energies,
        oxygen_ref,
        temperature,
        pressure_range,
        npoints,
    )
}

//! Entry store abstraction and local implementations.
//!
//! The remote materials-database client lives outside this workspace; it
//! only has to implement [`EntryStore`]. Transport, authentication and retry
//! policy are the implementation's business, and its failures are reported
//! through [`ChemError::Database`] and passed through unchanged.

use crate::composition::{ChemicalSystem, Composition};
use crate::entry::ThermoEntry;
use crate::error::{ChemError, ChemResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Family of calculations an entry set was computed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ThermoType {
    #[default]
    #[serde(rename = "GGA_GGA+U")]
    GgaGgaU,
    #[serde(rename = "R2SCAN")]
    R2Scan,
    #[serde(rename = "GGA_GGA+U_R2SCAN")]
    GgaGgaUR2Scan,
}

impl ThermoType {
    pub fn key(&self) -> &'static str {
        match self {
            ThermoType::GgaGgaU => "GGA_GGA+U",
            ThermoType::R2Scan => "R2SCAN",
            ThermoType::GgaGgaUR2Scan => "GGA_GGA+U_R2SCAN",
        }
    }
}

impl fmt::Display for ThermoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for ThermoType {
    type Err = ChemError;

    fn from_str(s: &str) -> ChemResult<Self> {
        match s.trim().to_uppercase().as_str() {
            "GGA_GGA+U" | "GGA+U" => Ok(ThermoType::GgaGgaU),
            "R2SCAN" => Ok(ThermoType::R2Scan),
            "GGA_GGA+U_R2SCAN" => Ok(ThermoType::GgaGgaUR2Scan),
            _ => Err(ChemError::UnknownThermoType(s.to_string())),
        }
    }
}

/// Source of thermodynamic entries and reference energies.
///
/// Implementations must be thread-safe (Send + Sync); the pressure engine
/// shares read-only results across worker threads.
pub trait EntryStore: Send + Sync {
    /// All entries whose elements lie inside `system`.
    fn entries_for_chemical_system(
        &self,
        system: &ChemicalSystem,
        thermo_type: ThermoType,
    ) -> ChemResult<Vec<ThermoEntry>>;

    /// Energy per formula unit [eV] of the most stable phase with the
    /// reduced composition of `composition`, scaled to `composition`.
    fn reference_energy(&self, composition: &Composition, thermo_type: ThermoType) -> ChemResult<f64>;
}

impl<S: EntryStore + ?Sized> EntryStore for &S {
    fn entries_for_chemical_system(
        &self,
        system: &ChemicalSystem,
        thermo_type: ThermoType,
    ) -> ChemResult<Vec<ThermoEntry>> {
        (**self).entries_for_chemical_system(system, thermo_type)
    }

    fn reference_energy(&self, composition: &Composition, thermo_type: ThermoType) -> ChemResult<f64> {
        (**self).reference_energy(composition, thermo_type)
    }
}

/// Serialized form of a local entry set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntrySet {
    #[serde(default)]
    pub thermo_type: ThermoType,
    pub entries: Vec<ThermoEntry>,
}

/// Entry store backed by an in-memory list of entries of one thermo type.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntryStore {
    thermo_type: ThermoType,
    entries: Vec<ThermoEntry>,
}

impl InMemoryEntryStore {
    pub fn new(thermo_type: ThermoType, entries: Vec<ThermoEntry>) -> Self {
        Self {
            thermo_type,
            entries,
        }
    }

    pub fn entries(&self) -> &[ThermoEntry] {
        &self.entries
    }

    pub fn thermo_type(&self) -> ThermoType {
        self.thermo_type
    }

    fn check_thermo_type(&self, requested: ThermoType) -> ChemResult<()> {
        if requested != self.thermo_type {
            return Err(ChemError::database(format!(
                "entry set holds {} entries, {} requested",
                self.thermo_type, requested
            )));
        }
        Ok(())
    }
}

impl From<EntrySet> for InMemoryEntryStore {
    fn from(set: EntrySet) -> Self {
        Self::new(set.thermo_type, set.entries)
    }
}

impl EntryStore for InMemoryEntryStore {
    fn entries_for_chemical_system(
        &self,
        system: &ChemicalSystem,
        thermo_type: ThermoType,
    ) -> ChemResult<Vec<ThermoEntry>> {
        self.check_thermo_type(thermo_type)?;
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.in_system(system))
            .cloned()
            .collect())
    }

    fn reference_energy(&self, composition: &Composition, thermo_type: ThermoType) -> ChemResult<f64> {
        self.check_thermo_type(thermo_type)?;
        self.entries
            .iter()
            .filter(|entry| entry.composition().same_reduced(composition, 1e-9))
            .min_by(|a, b| a.canonical_cmp(b))
            .map(|entry| entry.energy_per_atom() * composition.num_atoms())
            .ok_or_else(|| ChemError::MissingReferenceEnergy {
                formula: composition.formula(),
                thermo_type,
            })
    }
}

/// Memoizing wrapper: each distinct (reduced formula, thermo type) is fetched
/// from the inner store at most once.
pub struct CachedEntryStore<S> {
    inner: S,
    energies: Mutex<HashMap<(String, ThermoType), f64>>,
    systems: Mutex<HashMap<(String, ThermoType), Vec<ThermoEntry>>>,
    misses: AtomicUsize,
}

impl<S: EntryStore> CachedEntryStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            energies: Mutex::new(HashMap::new()),
            systems: Mutex::new(HashMap::new()),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of lookups forwarded to the inner store.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

impl<S: EntryStore> EntryStore for CachedEntryStore<S> {
    fn entries_for_chemical_system(
        &self,
        system: &ChemicalSystem,
        thermo_type: ThermoType,
    ) -> ChemResult<Vec<ThermoEntry>> {
        let key = (system.to_string(), thermo_type);
        if let Some(hit) = self
            .systems
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(hit.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let entries = self.inner.entries_for_chemical_system(system, thermo_type)?;
        self.systems
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entries.clone());
        Ok(entries)
    }

    fn reference_energy(&self, composition: &Composition, thermo_type: ThermoType) -> ChemResult<f64> {
        // Cached per formula unit of the reduced composition.
        let (reduced, factor) = composition.reduced();
        let key = (reduced.formula(), thermo_type);
        if let Some(per_reduced) = self
            .energies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(per_reduced * factor);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(formula = %key.0, %thermo_type, "fetching reference energy");
        let per_reduced = self.inner.reference_energy(&reduced, thermo_type)?;
        self.energies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, per_reduced);
        Ok(per_reduced * factor)
    }
}

/// Fetch reference energies for `compositions`, once per distinct reduced
/// formula, preserving the caller's order (duplicates dropped).
///
/// The first store error aborts the whole batch.
pub fn fetch_reference_energies<S: EntryStore + ?Sized>(
    store: &S,
    compositions: &[Composition],
    thermo_type: ThermoType,
) -> ChemResult<Vec<(Composition, f64)>> {
    let mut seen: HashMap<String, f64> = HashMap::new();
    let mut out = Vec::new();
    for composition in compositions {
        let key = composition.reduced_formula();
        if seen.contains_key(&key) {
            continue;
        }
        let energy = store.reference_energy(composition, thermo_type)?;
        seen.insert(key, energy);
        out.push((composition.clone(), energy));
    }
    Ok(out)
}

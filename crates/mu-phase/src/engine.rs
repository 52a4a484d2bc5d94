//! Stability-interval engine with a content-addressed cache.

use crate::diagram::PhaseDiagram;
use crate::error::PhaseResult;
use crate::interval::StabilityInterval;
use mu_chem::{ChemicalSystem, Composition, Element, ThermoEntry};
use mu_core::Tolerances;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Fingerprint of one stability-interval request.
///
/// Covers the chemical system, the entries inside it in canonical order,
/// the reduced target formula, the open element and the hull tolerance, so
/// equal fingerprints always mean equal results.
pub fn interval_fingerprint(
    system: &ChemicalSystem,
    entries: &[ThermoEntry],
    target: &Composition,
    open_element: Element,
    tol: Tolerances,
) -> String {
    let mut relevant: Vec<&ThermoEntry> = entries.iter().filter(|e| e.in_system(system)).collect();
    relevant.sort_by(|a, b| a.canonical_cmp(b));

    let mut hasher = Sha256::new();
    hasher.update(system.to_string().as_bytes());
    for entry in relevant {
        hasher.update(b"\n");
        hasher.update(entry.composition().formula().as_bytes());
        hasher.update(entry.energy().to_bits().to_le_bytes());
        hasher.update(entry.source().as_bytes());
    }
    hasher.update(b"\n");
    hasher.update(target.reduced_formula().as_bytes());
    hasher.update(open_element.symbol().as_bytes());
    hasher.update(tol.abs.to_bits().to_le_bytes());

    format!("{:x}", hasher.finalize())
}

/// Intervals an [`IntervalCache`] holds unless told otherwise.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct CacheState {
    map: HashMap<String, Arc<StabilityInterval>>,
    /// Insertion order, oldest first.
    order: VecDeque<String>,
}

/// Thread-safe map fingerprint -> interval.
///
/// Holds at most `capacity` intervals and evicts the oldest insertion when
/// full. A capacity of zero disables caching.
#[derive(Debug)]
pub struct IntervalCache {
    state: Mutex<CacheState>,
    capacity: usize,
    hits: AtomicUsize,
}

impl IntervalCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            capacity,
            hits: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<Arc<StabilityInterval>> {
        let hit = self.state().map.get(key).cloned();
        if hit.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    pub fn insert(&self, key: String, interval: Arc<StabilityInterval>) {
        if self.capacity == 0 {
            return;
        }
        let mut state = self.state();
        if let Some(slot) = state.map.get_mut(&key) {
            *slot = interval;
            return;
        }
        while state.map.len() >= self.capacity {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.map.remove(&oldest);
        }
        state.order.push_back(key.clone());
        state.map.insert(key, interval);
    }

    pub fn len(&self) -> usize {
        self.state().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        let mut state = self.state();
        state.map.clear();
        state.order.clear();
    }
}

impl Default for IntervalCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes stability intervals, memoizing them by fingerprint.
#[derive(Debug)]
pub struct PhaseStabilityEngine {
    tol: Tolerances,
    cache: IntervalCache,
}

impl PhaseStabilityEngine {
    pub fn new(tol: Tolerances) -> Self {
        Self {
            tol,
            cache: IntervalCache::new(),
        }
    }

    /// Replace the interval cache with an empty one holding at most
    /// `capacity` intervals.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = IntervalCache::with_capacity(capacity);
        self
    }

    pub fn tolerances(&self) -> Tolerances {
        self.tol
    }

    pub fn cache(&self) -> &IntervalCache {
        &self.cache
    }

    /// Stability interval of `target` over the chemical system it spans.
    pub fn stability_interval(
        &self,
        entries: &[ThermoEntry],
        target: &Composition,
        open_element: Element,
    ) -> PhaseResult<Arc<StabilityInterval>> {
        let system = target.chemical_system();
        let key = interval_fingerprint(&system, entries, target, open_element, self.tol);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(formula = %target, element = %open_element, "interval cache hit");
            return Ok(hit);
        }

        let interval = Arc::new(stability_interval(entries, target, open_element, self.tol)?);
        self.cache.insert(key, Arc::clone(&interval));
        Ok(interval)
    }
}

impl Default for PhaseStabilityEngine {
    fn default() -> Self {
        Self::new(Tolerances::hull())
    }
}

/// Uncached stability interval of `target` over the chemical system it spans.
pub fn stability_interval(
    entries: &[ThermoEntry],
    target: &Composition,
    open_element: Element,
    tol: Tolerances,
) -> PhaseResult<StabilityInterval> {
    let diagram = PhaseDiagram::new(entries, &target.chemical_system(), tol)?;
    diagram.stability_interval(target, open_element)
}

//! mu-phase: phase stability on top of the lower convex hull.
//!
//! - [`PhaseDiagram`]: entries of one chemical system and their hull
//! - [`StabilityInterval`]: potential range of one element for a stable phase
//! - [`PhaseStabilityEngine`]: interval computation with a fingerprint cache
//! - [`fixed_potential_equilibrium`]: potentials of a phase assemblage with
//!   one element held fixed

pub mod diagram;
pub mod engine;
pub mod equilibrium;
pub mod error;
pub mod interval;

pub use diagram::{FacetEquilibrium, PhaseDiagram};
pub use engine::{
    DEFAULT_CACHE_CAPACITY, IntervalCache, PhaseStabilityEngine, interval_fingerprint,
    stability_interval,
};
pub use equilibrium::fixed_potential_equilibrium;
pub use error::{PhaseError, PhaseResult, PhaseWarning};
pub use interval::StabilityInterval;

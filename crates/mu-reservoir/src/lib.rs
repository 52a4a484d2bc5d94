//! mu-reservoir: chemical-potential reservoirs.
//!
//! - [`condition`]: `"<Element>-<qualifier>"` tokens resolved over a
//!   stability interval, and the three-condition bulk reservoirs
//! - [`reservoirs`]: ordered, key-unique reservoirs and their builder
//! - [`grid`], [`oxygen`], [`precursor`], [`pressure`]: oxygen-pressure
//!   reservoirs buffered by precursor mixtures

pub mod condition;
pub mod error;
pub mod grid;
pub mod oxygen;
pub mod precursor;
pub mod pressure;
pub mod reservoirs;

pub use condition::{Condition, Qualifier, condition_reservoirs, default_element, resolve};
pub use error::{ReservoirError, ReservoirResult};
pub use grid::{PressureGrid, PressureRange};
pub use oxygen::{OxygenCorrection, OxygenModel};
pub use precursor::{PrecursorSet, missing_elements};
pub use pressure::{PRECURSOR_RESIDUAL_TOL, PressureReservoirEngine, TEMPERATURE_FLOOR_K};
pub use reservoirs::{ReservoirBuilder, ReservoirKey, Reservoirs, build};

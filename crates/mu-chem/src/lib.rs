//! mu-chem: chemistry vocabulary shared by the hull and reservoir crates.
//!
//! Provides:
//! - Periodic-table elements with formula ordering
//! - Compositions (formula parsing, reduction) and chemical systems
//! - Thermodynamic entries and chemical-potential sets
//! - The `EntryStore` trait plus in-memory and caching implementations
//!
//! # Example
//!
//! ```
//! use mu_chem::{Composition, ThermoEntry};
//!
//! let bto: Composition = "BaTiO3".parse().unwrap();
//! assert_eq!(bto.chemical_system().to_string(), "Ba-Ti-O");
//!
//! let entry = ThermoEntry::new(bto, -40.0, "mp-2998").unwrap();
//! assert_eq!(entry.energy_per_atom(), -8.0);
//! ```

pub mod chempots;
pub mod composition;
pub mod element;
pub mod entry;
pub mod error;
pub mod store;

// Re-exports for ergonomics
pub use chempots::Chempots;
pub use composition::{ChemicalSystem, Composition};
pub use element::Element;
pub use entry::ThermoEntry;
pub use error::{ChemError, ChemResult};
pub use store::{
    CachedEntryStore, EntrySet, EntryStore, InMemoryEntryStore, ThermoType,
    fetch_reference_energies,
};

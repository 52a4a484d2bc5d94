//! Shared application layer for the chemical-potential tools.
//!
//! Ties the stability engine and the reservoir builders to settings, entry
//! stores and JSON/YAML files, so the CLI and library callers share one code
//! path for condition, element and oxygen-pressure requests.

pub mod error;
pub mod io;
pub mod service;
pub mod settings;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use io::{
    FileFormat, load_chempots, load_entry_set, load_entry_store, load_reservoirs, read_value,
    save_chempots, save_reservoirs, to_text, write_value,
};
pub use service::{
    ChempotService, ChempotsOutcome, IntervalReport, PressureRequest, compute_condition_chempots,
    compute_pressure_reservoirs, compute_reservoirs_for_element,
};
pub use settings::{Settings, load_settings};

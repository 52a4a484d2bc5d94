//! Runtime settings, loaded from YAML or JSON.

use crate::error::{AppError, AppResult};
use crate::io::read_value;
use mu_chem::ThermoType;
use mu_core::Tolerances;
use mu_reservoir::{OxygenCorrection, PressureRange};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Hull tolerance [eV/atom].
    pub tolerance: f64,
    /// Pressure worker pool size; `None` uses all available cores.
    pub max_workers: Option<usize>,
    pub thermo_type: ThermoType,
    pub oxygen_correction: OxygenCorrection,
    /// Default pressure range [atm].
    pub pressure_range: PressureRange,
    pub npoints: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tolerance: Tolerances::hull().abs,
            max_workers: None,
            thermo_type: ThermoType::default(),
            oxygen_correction: OxygenCorrection::default(),
            pressure_range: PressureRange::default(),
            npoints: 50,
        }
    }
}

impl Settings {
    pub fn tolerances(&self) -> Tolerances {
        Tolerances::hull().with_abs(self.tolerance)
    }

    pub fn validate(&self) -> AppResult<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(AppError::Validation(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_workers == Some(0) {
            return Err(AppError::Validation("max_workers must be at least 1".to_string()));
        }
        if self.npoints == 0 {
            return Err(AppError::Validation("npoints must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Load and validate settings; the format follows the file extension.
pub fn load_settings(path: &Path) -> AppResult<Settings> {
    let settings: Settings = read_value(path)?;
    settings.validate()?;
    tracing::debug!(path = %path.display(), "settings loaded");
    Ok(settings)
}

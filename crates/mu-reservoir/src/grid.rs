//! Pressure ranges and log-uniform grids.

use crate::error::{ReservoirError, ReservoirResult};
use serde::{Deserialize, Serialize};

/// Closed pressure interval [atm] with `0 < low < high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct PressureRange {
    low: f64,
    high: f64,
}

impl PressureRange {
    pub fn new(low: f64, high: f64) -> ReservoirResult<Self> {
        let valid = low.is_finite() && high.is_finite() && low > 0.0 && low < high;
        if !valid {
            return Err(ReservoirError::InvalidPressureRange { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }
}

impl Default for PressureRange {
    /// 1e-20 to 1e10 atm.
    fn default() -> Self {
        Self {
            low: 1e-20,
            high: 1e10,
        }
    }
}

impl TryFrom<(f64, f64)> for PressureRange {
    type Error = ReservoirError;

    fn try_from((low, high): (f64, f64)) -> ReservoirResult<Self> {
        Self::new(low, high)
    }
}

impl From<PressureRange> for (f64, f64) {
    fn from(range: PressureRange) -> Self {
        (range.low, range.high)
    }
}

/// Strictly increasing pressures, log-uniform between the range bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureGrid {
    points: Vec<f64>,
}

impl PressureGrid {
    /// `npoints` values from `range.low` to `range.high` inclusive; a single
    /// point is `range.low`. Both endpoints are exact.
    pub fn log_uniform(range: PressureRange, npoints: usize) -> ReservoirResult<Self> {
        if npoints == 0 {
            return Err(ReservoirError::InvalidPointCount);
        }
        if npoints == 1 {
            return Ok(Self {
                points: vec![range.low],
            });
        }

        let log_start = range.low.ln();
        let log_end = range.high.ln();
        let log_delta = (log_end - log_start) / (npoints - 1) as f64;

        let mut points: Vec<f64> = (0..npoints)
            .map(|i| (log_start + i as f64 * log_delta).exp())
            .collect();
        points[0] = range.low;
        points[npoints - 1] = range.high;

        tracing::debug!(npoints, low = range.low, high = range.high, "pressure grid");
        Ok(Self { points })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

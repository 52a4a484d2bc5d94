use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute/relative tolerance pair.
///
/// `abs` is in the unit of whatever is being compared; for hull work that is
/// eV/atom.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

impl Tolerances {
    /// Tolerances for energies on the convex hull (eV/atom).
    pub const fn hull() -> Self {
        Self {
            abs: 1e-8,
            rel: 1e-10,
        }
    }

    /// Same relative tolerance, different absolute floor.
    pub const fn with_abs(self, abs: Real) -> Self {
        Self { abs, rel: self.rel }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Greatest common divisor of two non-negative integers.
pub fn gcd(a: u64, b: u64) -> u64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn hull_tolerance_is_looser() {
        let tol = Tolerances::hull();
        assert!(nearly_equal(-4.948, -4.948 + 5e-9, tol));
        assert!(!nearly_equal(-4.948, -4.948 + 1e-6, tol));
        assert_eq!(tol.with_abs(1e-3).abs, 1e-3);
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn gcd_small_values() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(1, 3), 1);
    }
}

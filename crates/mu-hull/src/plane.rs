//! Hyperplane solves shared by the hull walk and fixed-potential
//! equilibria.
//!
//! A hyperplane through points `x_i` with heights `e_i` is the vector `c`
//! solving `Σ_j x_ij c_j = e_i`. For composition/energy points `c` is the set
//! of chemical potentials.

use nalgebra::{DMatrix, DVector};

/// Pivots whose determinant falls below this are treated as singular.
pub const SINGULAR_TOL: f64 = 1e-12;

/// Solve the square system `rows · c = rhs`.
///
/// Returns `None` when `rows` is not square or is (numerically) singular.
pub fn solve_plane(rows: &DMatrix<f64>, rhs: &DVector<f64>) -> Option<DVector<f64>> {
    if rows.nrows() != rows.ncols() || rows.nrows() != rhs.len() {
        return None;
    }
    if rows.nrows() == 0 {
        return Some(DVector::zeros(0));
    }
    if rows.determinant().abs() < SINGULAR_TOL {
        return None;
    }
    rows.clone().lu().solve(rhs)
}

/// Least-squares solution of an overdetermined system and its largest
/// absolute residual.
///
/// Returns `None` when the columns are rank deficient.
pub fn least_squares(rows: &DMatrix<f64>, rhs: &DVector<f64>) -> Option<(DVector<f64>, f64)> {
    if rows.nrows() < rows.ncols() || rows.nrows() != rhs.len() {
        return None;
    }
    let svd = rows.clone().svd(true, true);
    if svd.rank(SINGULAR_TOL) < rows.ncols() {
        return None;
    }
    let c = svd.solve(rhs, SINGULAR_TOL).ok()?;
    let residual = (rows * &c - rhs).amax();
    Some((c, residual))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_tie_line() {
        // Ba + O at (1, 0) -> -2, BaO at (0.5, 0.5) -> -6.
        let rows = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.5, 0.5]);
        let rhs = DVector::from_vec(vec![-2.0, -6.0]);
        let c = solve_plane(&rows, &rhs).unwrap();
        assert!((c[0] + 2.0).abs() < 1e-12);
        assert!((c[1] + 10.0).abs() < 1e-12);
    }

    #[test]
    fn singular_system_is_rejected() {
        let rows = DMatrix::from_row_slice(2, 2, &[0.5, 0.5, 0.5, 0.5]);
        let rhs = DVector::from_vec(vec![-6.0, -5.0]);
        assert!(solve_plane(&rows, &rhs).is_none());

        let rows = DMatrix::from_row_slice(1, 2, &[0.5, 0.5]);
        let rhs = DVector::from_vec(vec![-6.0]);
        assert!(solve_plane(&rows, &rhs).is_none());
    }

    #[test]
    fn least_squares_reports_residual() {
        // Consistent: x = 1, 2x = 2, 3x = 3.
        let rows = DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]);
        let rhs = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let (c, residual) = least_squares(&rows, &rhs).unwrap();
        assert!((c[0] - 1.0).abs() < 1e-12);
        assert!(residual < 1e-12);

        // Inconsistent: x = 1, x = 2.
        let rows = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let rhs = DVector::from_vec(vec![1.0, 2.0]);
        let (c, residual) = least_squares(&rows, &rhs).unwrap();
        assert!((c[0] - 1.5).abs() < 1e-12);
        assert!((residual - 0.5).abs() < 1e-12);
    }
}

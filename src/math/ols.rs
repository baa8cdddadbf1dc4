//! Dense least-squares solve shared by the polynomial and non-linear fitters.
//!
//! Both callers reduce their problem to
//!
//! ```text
//! minimize ‖A x - b‖²
//! ```
//!
//! with a tall, tiny `A` (a handful of columns): weighted polynomial fits
//! scale rows by `sqrt(w_i)`, and every Levenberg–Marquardt step appends the
//! damping rows below the Jacobian. SVD copes with both and with the
//! rank-deficient systems produced by degenerate sample sets (repeated
//! abscissae, a zero amplitude seed).

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if no finite solution exists at any accepted tolerance.
pub fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    if a.nrows() == 0 || a.ncols() == 0 || a.nrows() != b.len() {
        return None;
    }
    let svd = a.clone().svd(true, true);

    // Singular values under the tolerance are treated as zero, which yields
    // the minimum-norm solution for rank-deficient systems.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(x) = svd.solve(b, tol) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }

    None
}

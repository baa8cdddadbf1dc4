//! Weighted polynomial least squares.
//!
//! Fits `y ≈ c0 + c1 x + c2 x² + …` by minimizing `Σ w_i (y_i - p(x_i))²`.
//! [`evaluate`] is the evaluation contract for every coefficient vector this
//! crate produces, including the exponent of the log-polynomial model in
//! [`crate::models`].

use nalgebra::{DMatrix, DVector};

use crate::math::solve_least_squares;

/// Accumulates `(x, y, w)` samples and fits polynomial coefficients.
#[derive(Debug, Clone, Default)]
pub struct PolynomialFitter {
    points: Vec<[f64; 3]>,
}

impl PolynomialFitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn add_data_point(&mut self, x: f64, y: f64, w: f64) {
        self.points.push([x, y, w]);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fit `n_terms` coefficients, constant term first.
    ///
    /// Samples with a non-finite coordinate or a non-positive weight are
    /// ignored. If no solution exists (no usable samples, or `n_terms == 0`)
    /// every coefficient is NaN.
    pub fn fit(&self, n_terms: usize) -> Vec<f64> {
        let usable: Vec<&[f64; 3]> = self
            .points
            .iter()
            .filter(|[x, y, w]| x.is_finite() && y.is_finite() && w.is_finite() && *w > 0.0)
            .collect();
        if n_terms == 0 {
            return Vec::new();
        }
        if usable.is_empty() {
            return vec![f64::NAN; n_terms];
        }

        let mut a = DMatrix::<f64>::zeros(usable.len(), n_terms);
        let mut b = DVector::<f64>::zeros(usable.len());
        for (row, [x, y, w]) in usable.iter().enumerate() {
            let sw = w.sqrt();
            let mut power = 1.0;
            for col in 0..n_terms {
                a[(row, col)] = power * sw;
                power *= x;
            }
            b[row] = y * sw;
        }

        match solve_least_squares(&a, &b) {
            Some(terms) => terms.iter().copied().collect(),
            None => vec![f64::NAN; n_terms],
        }
    }

    /// Evaluate `terms[0] + terms[1]·x + terms[2]·x² + …`.
    pub fn evaluate(x: f64, terms: &[f64]) -> f64 {
        evaluate(x, terms)
    }
}

/// Evaluate `terms[0] + terms[1]·x + terms[2]·x² + …`. An empty slice is 0.
pub fn evaluate(x: f64, terms: &[f64]) -> f64 {
    terms.iter().rev().fold(0.0, |acc, &t| acc * x + t)
}

//! Non-linear least-squares fitting of analytic spectral forms.
//!
//! Log-log linear regression cannot use zero or negative fluxes, which are
//! common for faint sources and for Stokes Q/U/V. The forms in
//! [`crate::models`] are instead fitted directly in linear flux space by
//! minimizing
//!
//! ```text
//! Σ (y_i - model(x_i; p))²
//! ```
//!
//! with Levenberg–Marquardt:
//! - every step solves the damped system `[J; √λ·D] δ = [r; 0]` through the
//!   shared SVD least-squares solver, with `D` the Jacobian column norms
//! - an accepted step divides λ by 10, a rejected one multiplies it by 10
//! - abscissae are normalized by their geometric mean before iterating and
//!   the parameters are mapped back exactly afterwards, so frequencies in Hz
//!   do not wreck the conditioning of `x^e`

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SedError;
use crate::fit::FitterConfig;
use crate::math::solve_least_squares;
use crate::models::{CurveForm, fill_jacobian_row, predict};

/// Floor for the damping scale of a parameter whose Jacobian column vanishes.
const MIN_COLUMN_SCALE: f64 = 1e-12;
const MIN_DAMPING: f64 = 1e-15;
const MAX_DAMPING: f64 = 1e16;

/// `flux = factor · frequency^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLawFit {
    pub factor: f64,
    pub exponent: f64,
}

impl PowerLawFit {
    /// Starting point of the non-linear power-law fit: a flat unit spectrum.
    pub const SEED: Self = Self {
        factor: 1.0,
        exponent: 0.0,
    };

    /// Sentinel for "nothing to fit".
    pub fn nan() -> Self {
        Self {
            factor: f64::NAN,
            exponent: f64::NAN,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.factor.is_finite() && self.exponent.is_finite()
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.factor * x.powf(self.exponent)
    }
}

/// `flux = a · frequency^(b + c·ln frequency)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvedPowerLawFit {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl CurvedPowerLawFit {
    pub const SEED: Self = Self {
        a: 0.0,
        b: 1.0,
        c: 0.0,
    };

    pub fn evaluate(&self, x: f64) -> f64 {
        self.a * x.powf(self.b + self.c * x.ln())
    }
}

/// A least-squares fitter for the three spectral parameterizations.
///
/// Samples are `(x, y)` pairs; implementations ignore pairs with a
/// non-finite coordinate or a non-positive `x`, and return NaN parameters
/// when nothing is left. Implementations hold no shared state, so one
/// instance can serve many threads.
pub trait NonLinearFitter {
    fn fit_power_law(&self, samples: &[(f64, f64)], seed: PowerLawFit) -> PowerLawFit;

    fn fit_curved_power_law(
        &self,
        samples: &[(f64, f64)],
        seed: CurvedPowerLawFit,
    ) -> CurvedPowerLawFit;

    /// Fit `y = exp(Σ c_k ln(x)^k)`; the number of terms is `seed.len()`.
    fn fit_log_polynomial(&self, samples: &[(f64, f64)], seed: &[f64]) -> Vec<f64>;
}

/// Damped Gauss–Newton fitter.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    config: FitterConfig,
}

impl LevenbergMarquardt {
    pub fn new(config: FitterConfig) -> Result<Self, SedError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FitterConfig {
        &self.config
    }

    /// Fit `form` to `samples` starting from `seed`.
    ///
    /// Returns NaN parameters if no sample is usable or `seed` does not have
    /// `form.param_len()` entries.
    pub fn minimize(&self, form: CurveForm, samples: &[(f64, f64)], seed: &[f64]) -> Vec<f64> {
        let m = form.param_len();
        let usable: Vec<(f64, f64)> = samples
            .iter()
            .copied()
            .filter(|&(x, y)| x.is_finite() && x > 0.0 && y.is_finite())
            .collect();
        if m == 0 {
            return Vec::new();
        }
        if usable.is_empty() || seed.len() != m {
            return vec![f64::NAN; m];
        }

        let ln_x0 = usable.iter().map(|(x, _)| x.ln()).sum::<f64>() / usable.len() as f64;
        let xs: Vec<f64> = usable.iter().map(|(x, _)| (x.ln() - ln_x0).exp()).collect();
        let ys: Vec<f64> = usable.iter().map(|&(_, y)| y).collect();

        let params = self.iterate(form, &xs, &ys, seed.to_vec());
        denormalize(form, &params, ln_x0)
    }

    fn iterate(&self, form: CurveForm, xs: &[f64], ys: &[f64], mut params: Vec<f64>) -> Vec<f64> {
        let n = xs.len();
        let m = params.len();

        let mut cost = sum_squared_residuals(form, xs, ys, &params);
        if !cost.is_finite() {
            return vec![f64::NAN; m];
        }

        let mut lambda = self.config.initial_damping;
        let mut system = DMatrix::<f64>::zeros(n + m, m);
        let mut rhs = DVector::<f64>::zeros(n + m);
        let mut row = vec![0.0; m];
        let mut iterations = 0usize;

        while iterations < self.config.max_iterations && cost > 0.0 {
            iterations += 1;

            for i in 0..n {
                fill_jacobian_row(form, xs[i], &params, &mut row);
                for (j, &v) in row.iter().enumerate() {
                    system[(i, j)] = v;
                }
                rhs[i] = ys[i] - predict(form, xs[i], &params);
            }
            let sqrt_lambda = lambda.sqrt();
            for j in 0..m {
                let column_norm = (0..n)
                    .map(|i| system[(i, j)] * system[(i, j)])
                    .sum::<f64>()
                    .sqrt()
                    .max(MIN_COLUMN_SCALE);
                for k in 0..m {
                    system[(n + j, k)] = if j == k { sqrt_lambda * column_norm } else { 0.0 };
                }
                rhs[n + j] = 0.0;
            }

            let Some(step) = solve_least_squares(&system, &rhs) else {
                lambda *= 10.0;
                if lambda > MAX_DAMPING {
                    break;
                }
                continue;
            };

            let trial: Vec<f64> = params.iter().zip(step.iter()).map(|(p, d)| p + d).collect();
            let trial_cost = sum_squared_residuals(form, xs, ys, &trial);

            if trial_cost.is_finite() && trial_cost < cost {
                let improvement = (cost - trial_cost) / cost;
                let step_norm = step.norm();
                let param_norm = trial.iter().map(|v| v * v).sum::<f64>().sqrt();
                params = trial;
                cost = trial_cost;
                lambda = (lambda / 10.0).max(MIN_DAMPING);
                let tol = self.config.tolerance;
                if improvement < tol || step_norm <= tol * (param_norm + tol) {
                    break;
                }
            } else {
                lambda *= 10.0;
                if lambda > MAX_DAMPING {
                    break;
                }
            }
        }

        debug!(
            form = form.display_name(),
            samples = n,
            iterations,
            cost,
            "non-linear fit finished"
        );
        params
    }
}

impl NonLinearFitter for LevenbergMarquardt {
    fn fit_power_law(&self, samples: &[(f64, f64)], seed: PowerLawFit) -> PowerLawFit {
        let p = self.minimize(CurveForm::PowerLaw, samples, &[seed.factor, seed.exponent]);
        PowerLawFit {
            factor: p[0],
            exponent: p[1],
        }
    }

    fn fit_curved_power_law(
        &self,
        samples: &[(f64, f64)],
        seed: CurvedPowerLawFit,
    ) -> CurvedPowerLawFit {
        let p = self.minimize(CurveForm::CurvedPowerLaw, samples, &[seed.a, seed.b, seed.c]);
        CurvedPowerLawFit {
            a: p[0],
            b: p[1],
            c: p[2],
        }
    }

    fn fit_log_polynomial(&self, samples: &[(f64, f64)], seed: &[f64]) -> Vec<f64> {
        let form = CurveForm::LogPolynomial { n_terms: seed.len() };
        self.minimize(form, samples, seed)
    }
}

fn sum_squared_residuals(form: CurveForm, xs: &[f64], ys: &[f64], params: &[f64]) -> f64 {
    let sse: f64 = xs
        .iter()
        .zip(ys.iter())
        .map(|(&x, &y)| {
            let r = y - predict(form, x, params);
            r * r
        })
        .sum();
    if sse.is_finite() { sse } else { f64::INFINITY }
}

/// Map parameters fitted against `t = x / x0` back to parameters in `x`,
/// where `ln_x0 = ln x0`.
fn denormalize(form: CurveForm, params: &[f64], ln_x0: f64) -> Vec<f64> {
    match form {
        // f' t^e = f' x0^-e x^e
        CurveForm::PowerLaw => vec![params[0] * (-params[1] * ln_x0).exp(), params[1]],
        // With u = L - ℓ: b'u + c'u² = c'L² + (b' - 2c'ℓ)L + (c'ℓ² - b'ℓ)
        CurveForm::CurvedPowerLaw => {
            let (a, b, c) = (params[0], params[1], params[2]);
            vec![
                a * (c * ln_x0 * ln_x0 - b * ln_x0).exp(),
                b - 2.0 * c * ln_x0,
                c,
            ]
        }
        CurveForm::LogPolynomial { .. } => shift_polynomial(params, -ln_x0),
    }
}

/// Coefficients of `q(L) = p(L + shift)`.
fn shift_polynomial(coeffs: &[f64], shift: f64) -> Vec<f64> {
    let mut out = vec![0.0; coeffs.len()];
    for &c in coeffs.iter().rev() {
        // out = out * (L + shift) + c
        for j in (1..out.len()).rev() {
            out[j] = out[j - 1] + shift * out[j];
        }
        if let Some(first) = out.first_mut() {
            *first = shift * *first + c;
        }
    }
    out
}

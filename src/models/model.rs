//! Analytic spectral forms fitted by the non-linear fitter.
//!
//! The fitter relies on two primitive operations:
//! - predict y(x) given the parameter vector (for residuals)
//! - fill the Jacobian row ∂y/∂p at x (for the Gauss–Newton step)
//!
//! Parameter layouts, with `L = ln x`:
//!
//! | form | parameters | model |
//! |---|---|---|
//! | `PowerLaw` | `[f, e]` | `f · x^e` |
//! | `CurvedPowerLaw` | `[a, b, c]` | `a · x^(b + c·L)` |
//! | `LogPolynomial(n)` | `[c0 .. c(n-1)]` | `exp(c0 + c1·L + … )` |

use serde::{Deserialize, Serialize};

use crate::math::evaluate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveForm {
    PowerLaw,
    CurvedPowerLaw,
    LogPolynomial { n_terms: usize },
}

impl CurveForm {
    pub fn display_name(self) -> &'static str {
        match self {
            CurveForm::PowerLaw => "power law",
            CurveForm::CurvedPowerLaw => "curved power law",
            CurveForm::LogPolynomial { .. } => "log-polynomial",
        }
    }

    /// Number of free parameters.
    pub fn param_len(self) -> usize {
        match self {
            CurveForm::PowerLaw => 2,
            CurveForm::CurvedPowerLaw => 3,
            CurveForm::LogPolynomial { n_terms } => n_terms,
        }
    }
}

/// Predict `y(x)` for the given form.
///
/// # Panics
/// Panics if `params` is shorter than `form.param_len()`.
pub fn predict(form: CurveForm, x: f64, params: &[f64]) -> f64 {
    let lg = x.ln();
    match form {
        CurveForm::PowerLaw => params[0] * (params[1] * lg).exp(),
        CurveForm::CurvedPowerLaw => params[0] * (lg * (params[1] + params[2] * lg)).exp(),
        CurveForm::LogPolynomial { n_terms } => evaluate(lg, &params[..n_terms]).exp(),
    }
}

/// Fill the Jacobian row `∂y/∂p_j` at `x`.
///
/// # Panics
/// Panics if `params` or `out` are shorter than `form.param_len()`.
pub fn fill_jacobian_row(form: CurveForm, x: f64, params: &[f64], out: &mut [f64]) {
    let lg = x.ln();
    match form {
        CurveForm::PowerLaw => {
            let shape = (params[1] * lg).exp();
            out[0] = shape;
            out[1] = params[0] * shape * lg;
        }
        CurveForm::CurvedPowerLaw => {
            let shape = (lg * (params[1] + params[2] * lg)).exp();
            let y = params[0] * shape;
            out[0] = shape;
            out[1] = y * lg;
            out[2] = y * lg * lg;
        }
        CurveForm::LogPolynomial { n_terms } => {
            let y = evaluate(lg, &params[..n_terms]).exp();
            let mut power = 1.0;
            for slot in out.iter_mut().take(n_terms) {
                *slot = y * power;
                power *= lg;
            }
        }
    }
}

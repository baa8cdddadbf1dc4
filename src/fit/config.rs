//! Tuning knobs of the non-linear fitter.

use serde::{Deserialize, Serialize};

use crate::error::SedError;

/// Levenberg–Marquardt settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitterConfig {
    /// Upper bound on damped Gauss–Newton steps (accepted or rejected).
    pub max_iterations: usize,
    /// Stop when an accepted step lowers the cost by less than this fraction,
    /// or when the step length falls below it relative to the parameter norm.
    pub tolerance: f64,
    /// Starting damping factor λ.
    pub initial_damping: f64,
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-12,
            initial_damping: 1e-3,
        }
    }
}

impl FitterConfig {
    pub fn validate(&self) -> Result<(), SedError> {
        if self.max_iterations == 0 {
            return Err(SedError::InvalidConfig("max_iterations must be >= 1".into()));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SedError::InvalidConfig(format!(
                "tolerance must be finite and > 0, got {}",
                self.tolerance
            )));
        }
        if !(self.initial_damping.is_finite() && self.initial_damping > 0.0) {
            return Err(SedError::InvalidConfig(format!(
                "initial_damping must be finite and > 0, got {}",
                self.initial_damping
            )));
        }
        Ok(())
    }
}

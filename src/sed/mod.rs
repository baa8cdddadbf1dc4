//! Spectral energy distributions.
//!
//! Two representations share one small capability set ([`SpectralModel`]):
//!
//! - [`MeasuredSed`]: sparse flux samples, interpolated as piecewise power laws
//! - [`AnalyticSed`]: a reference flux with spectral-index or polynomial terms
//!
//! [`Sed`] is the closed choice between them that a component owns.

pub mod analytic;
pub mod diagnostics;
pub mod fitting;
pub mod measured;

pub use analytic::*;
pub use diagnostics::*;
pub use measured::*;

use serde::{Deserialize, Serialize};

use crate::domain::Polarization;

/// What every SED can answer.
pub trait SpectralModel {
    /// Flux density [Jy] of `polarization` at `frequency_hz`.
    fn flux_at_frequency(&self, frequency_hz: f64, polarization: Polarization) -> f64;

    /// Mean flux density [Jy] over `[start_hz, end_hz]`.
    fn integrated_flux(&self, start_hz: f64, end_hz: f64, polarization: Polarization) -> f64;

    fn reference_frequency_hz(&self) -> f64;
}

/// The SED of a component: sampled or parametric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sed {
    Measured(MeasuredSed),
    Analytic(AnalyticSed),
}

impl Sed {
    pub fn as_measured(&self) -> Option<&MeasuredSed> {
        match self {
            Sed::Measured(sed) => Some(sed),
            Sed::Analytic(_) => None,
        }
    }

    pub fn as_analytic(&self) -> Option<&AnalyticSed> {
        match self {
            Sed::Measured(_) => None,
            Sed::Analytic(sed) => Some(sed),
        }
    }
}

impl SpectralModel for Sed {
    fn flux_at_frequency(&self, frequency_hz: f64, polarization: Polarization) -> f64 {
        match self {
            Sed::Measured(sed) => sed.flux_at_frequency(frequency_hz, polarization),
            Sed::Analytic(sed) => sed.flux_at_frequency(frequency_hz, polarization),
        }
    }

    fn integrated_flux(&self, start_hz: f64, end_hz: f64, polarization: Polarization) -> f64 {
        match self {
            Sed::Measured(sed) => sed.integrated_flux(start_hz, end_hz, polarization),
            Sed::Analytic(sed) => sed.integrated_flux(start_hz, end_hz, polarization),
        }
    }

    fn reference_frequency_hz(&self) -> f64 {
        match self {
            Sed::Measured(sed) => sed.reference_frequency_hz(),
            Sed::Analytic(sed) => sed.reference_frequency_hz(),
        }
    }
}

impl From<MeasuredSed> for Sed {
    fn from(sed: MeasuredSed) -> Self {
        Sed::Measured(sed)
    }
}

impl From<AnalyticSed> for Sed {
    fn from(sed: AnalyticSed) -> Self {
        Sed::Analytic(sed)
    }
}

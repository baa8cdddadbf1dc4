//! Parametric spectral energy distributions.
//!
//! An [`AnalyticSed`] scales a reference flux per polarization by a shape
//! function of `t = ν / ν_ref` that equals 1 at the reference frequency:
//!
//! ```text
//! logarithmic:  shape(t) = exp(Σ_k term_k · ln(t)^(k+1))
//! linear:       shape(t) = 1 + Σ_k term_k · (t - 1)^(k+1)
//! ```
//!
//! A single logarithmic term is a plain spectral index. Band means are
//! closed form except for curved logarithmic shapes, which are integrated
//! with Gauss–Legendre quadrature in `ln ν`.

use serde::{Deserialize, Serialize};

use crate::domain::Polarization;
use crate::error::SedError;
use crate::math::{evaluate, power_law_mean};
use crate::sed::SpectralModel;

/// Panels of the composite quadrature over the band.
const QUADRATURE_PANELS: usize = 16;

/// 5-point Gauss–Legendre nodes and weights on [-1, 1].
const GAUSS_NODES: [f64; 5] = [
    -0.906_179_845_938_664,
    -0.538_469_310_105_683,
    0.0,
    0.538_469_310_105_683,
    0.906_179_845_938_664,
];
const GAUSS_WEIGHTS: [f64; 5] = [
    0.236_926_885_056_189,
    0.478_628_670_499_366,
    0.568_888_888_888_889,
    0.478_628_670_499_366,
    0.236_926_885_056_189,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticSed {
    reference_frequency_hz: f64,
    /// Flux densities [Jy] at the reference frequency, by `Polarization::index`.
    reference_flux: [f64; 4],
    terms: Vec<f64>,
    logarithmic: bool,
}

impl AnalyticSed {
    pub fn new(
        reference_frequency_hz: f64,
        reference_flux: [f64; 4],
        terms: Vec<f64>,
        logarithmic: bool,
    ) -> Result<Self, SedError> {
        if !(reference_frequency_hz.is_finite() && reference_frequency_hz > 0.0) {
            return Err(SedError::InvalidReferenceFrequency {
                frequency_hz: reference_frequency_hz,
            });
        }
        Ok(Self {
            reference_frequency_hz,
            reference_flux,
            terms,
            logarithmic,
        })
    }

    /// Stokes I power law `S = stokes_i · (ν/ν_ref)^spectral_index`.
    pub fn power_law(
        reference_frequency_hz: f64,
        stokes_i: f64,
        spectral_index: f64,
    ) -> Result<Self, SedError> {
        Self::new(
            reference_frequency_hz,
            [stokes_i, 0.0, 0.0, 0.0],
            vec![spectral_index],
            true,
        )
    }

    pub fn reference_frequency_hz(&self) -> f64 {
        self.reference_frequency_hz
    }

    pub fn reference_flux(&self, polarization: Polarization) -> f64 {
        self.reference_flux[polarization.index()]
    }

    pub fn reference_fluxes(&self) -> [f64; 4] {
        self.reference_flux
    }

    pub fn terms(&self) -> &[f64] {
        &self.terms
    }

    pub fn is_logarithmic(&self) -> bool {
        self.logarithmic
    }

    fn shape(&self, t: f64) -> f64 {
        if self.logarithmic {
            let l = t.ln();
            (l * evaluate(l, &self.terms)).exp()
        } else {
            let d = t - 1.0;
            1.0 + d * evaluate(d, &self.terms)
        }
    }

    /// Mean of the shape over `t ∈ [t0, t1]`, `t0 < t1`.
    fn mean_shape(&self, t0: f64, t1: f64) -> f64 {
        if !self.logarithmic {
            // ∫ (t-1)^(k+1) dt = (t-1)^(k+2) / (k+2)
            let (d0, d1) = (t0 - 1.0, t1 - 1.0);
            let poly: f64 = self
                .terms
                .iter()
                .enumerate()
                .map(|(k, term)| {
                    let p = (k + 2) as i32;
                    term * (d1.powi(p) - d0.powi(p)) / p as f64
                })
                .sum();
            return 1.0 + poly / (t1 - t0);
        }
        match self.terms.as_slice() {
            [] => 1.0,
            [alpha] => power_law_mean(*alpha, t0, t1),
            _ => self.quadrature(t0, t1) / (t1 - t0),
        }
    }

    /// `∫ shape(t) dt` over `[t0, t1]`, substituting `u = ln t`.
    fn quadrature(&self, t0: f64, t1: f64) -> f64 {
        let (u0, u1) = (t0.ln(), t1.ln());
        let half = 0.5 * (u1 - u0) / QUADRATURE_PANELS as f64;
        (0..QUADRATURE_PANELS)
            .map(|panel| {
                let centre = u0 + (2 * panel + 1) as f64 * half;
                GAUSS_NODES
                    .iter()
                    .zip(GAUSS_WEIGHTS)
                    .map(|(node, weight)| {
                        let u = centre + node * half;
                        weight * (u + u * evaluate(u, &self.terms)).exp()
                    })
                    .sum::<f64>()
                    * half
            })
            .sum()
    }

    /// Flux density [Jy] of `polarization` at `frequency_hz`.
    pub fn flux_at_frequency(&self, frequency_hz: f64, polarization: Polarization) -> f64 {
        let t = frequency_hz / self.reference_frequency_hz;
        self.reference_flux(polarization) * self.shape(t)
    }

    /// Mean flux density [Jy] over `[start_hz, end_hz]`; reversed bounds are swapped.
    pub fn integrated_flux(&self, start_hz: f64, end_hz: f64, polarization: Polarization) -> f64 {
        let (start_hz, end_hz) = if start_hz <= end_hz {
            (start_hz, end_hz)
        } else {
            (end_hz, start_hz)
        };
        if start_hz == end_hz {
            return self.flux_at_frequency(start_hz, polarization);
        }
        let t0 = start_hz / self.reference_frequency_hz;
        let t1 = end_hz / self.reference_frequency_hz;
        self.reference_flux(polarization) * self.mean_shape(t0, t1)
    }
}

impl SpectralModel for AnalyticSed {
    fn flux_at_frequency(&self, frequency_hz: f64, polarization: Polarization) -> f64 {
        AnalyticSed::flux_at_frequency(self, frequency_hz, polarization)
    }

    fn integrated_flux(&self, start_hz: f64, end_hz: f64, polarization: Polarization) -> f64 {
        AnalyticSed::integrated_flux(self, start_hz, end_hz, polarization)
    }

    fn reference_frequency_hz(&self) -> f64 {
        self.reference_frequency_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curved() -> AnalyticSed {
        AnalyticSed::new(150e6, [2.0, 0.2, 0.0, -0.1], vec![-0.7, -0.2, 0.05], true).unwrap()
    }

    /// Midpoint rule with many panels, for cross-checking.
    fn brute_mean(sed: &AnalyticSed, lo: f64, hi: f64) -> f64 {
        let n = 200_000;
        let h = (hi - lo) / n as f64;
        (0..n)
            .map(|i| sed.flux_at_frequency(lo + (i as f64 + 0.5) * h, Polarization::I))
            .sum::<f64>()
            / n as f64
    }

    #[test]
    fn reference_frequency_returns_reference_flux() {
        let sed = curved();
        assert_eq!(sed.flux_at_frequency(150e6, Polarization::I), 2.0);
        assert_eq!(sed.flux_at_frequency(150e6, Polarization::V), -0.1);

        let linear = AnalyticSed::new(150e6, [2.0, 0.0, 0.0, 0.0], vec![0.3, -0.1], false).unwrap();
        assert_eq!(linear.flux_at_frequency(150e6, Polarization::I), 2.0);
    }

    #[test]
    fn single_log_term_is_a_spectral_index() {
        let sed = AnalyticSed::power_law(100e6, 10.0, -1.0).unwrap();
        assert!((sed.flux_at_frequency(200e6, Polarization::I) - 5.0).abs() < 1e-12);
        let mean = sed.integrated_flux(100e6, 200e6, Polarization::I);
        assert!((mean - 10.0 * std::f64::consts::LN_2).abs() < 1e-12);
        assert_eq!(sed.flux_at_frequency(200e6, Polarization::Q), 0.0);
    }

    #[test]
    fn curved_log_integration_matches_brute_force() {
        let sed = curved();
        for (lo, hi) in [(100e6, 200e6), (60e6, 240e6), (140e6, 160e6)] {
            let mean = sed.integrated_flux(lo, hi, Polarization::I);
            let expected = brute_mean(&sed, lo, hi);
            assert!(
                (mean - expected).abs() < 1e-8 * expected.abs(),
                "mean={mean} expected={expected}"
            );
        }
    }

    #[test]
    fn linear_integration_is_exact() {
        // shape = 1 + 0.5 (t-1) + 0.25 (t-1)^2 ; mean over t ∈ [1, 2]
        // = 1 + 0.5/2 + 0.25/3
        let sed = AnalyticSed::new(100e6, [4.0, 0.0, 0.0, 0.0], vec![0.5, 0.25], false).unwrap();
        let mean = sed.integrated_flux(100e6, 200e6, Polarization::I);
        let expected = 4.0 * (1.0 + 0.25 + 0.25 / 3.0);
        assert!((mean - expected).abs() < 1e-12);
        let brute = brute_mean(&sed, 100e6, 200e6);
        assert!((mean - brute).abs() < 1e-8);
    }

    #[test]
    fn no_terms_is_flat() {
        for logarithmic in [true, false] {
            let sed =
                AnalyticSed::new(100e6, [3.0, 0.0, 0.0, 0.0], Vec::new(), logarithmic).unwrap();
            assert_eq!(sed.flux_at_frequency(900e6, Polarization::I), 3.0);
            assert!((sed.integrated_flux(50e6, 900e6, Polarization::I) - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn reversed_and_zero_width_bands() {
        let sed = curved();
        assert_eq!(
            sed.integrated_flux(200e6, 100e6, Polarization::I),
            sed.integrated_flux(100e6, 200e6, Polarization::I)
        );
        assert_eq!(
            sed.integrated_flux(120e6, 120e6, Polarization::U),
            sed.flux_at_frequency(120e6, Polarization::U)
        );
    }

    #[test]
    fn invalid_reference_frequency_is_rejected() {
        for f in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                AnalyticSed::new(f, [1.0; 4], Vec::new(), true),
                Err(SedError::InvalidReferenceFrequency { .. })
            ));
        }
    }
}

//! Fitting a [`MeasuredSed`] to compact analytic forms.
//!
//! Power laws are fitted by ordinary least squares in log-log space when every
//! flux is positive. A single non-positive flux sends the whole sample set to
//! the non-linear fitter, which works in linear flux space.
//!
//! Every `*_with` method takes the [`NonLinearFitter`] to use; the plain
//! variants use a default [`LevenbergMarquardt`].

use tracing::debug;

use crate::domain::Polarization;
use crate::error::SedError;
use crate::fit::{CurvedPowerLawFit, LevenbergMarquardt, NonLinearFitter, PowerLawFit};
use crate::math::PolynomialFitter;
use crate::sed::{AnalyticSed, MeasuredSed};

fn validate_reference(reference_frequency_hz: f64) -> Result<(), SedError> {
    if reference_frequency_hz.is_finite() && reference_frequency_hz > 0.0 {
        Ok(())
    } else {
        Err(SedError::InvalidReferenceFrequency {
            frequency_hz: reference_frequency_hz,
        })
    }
}

fn validate_terms(n_terms: usize) -> Result<(), SedError> {
    if n_terms == 0 {
        Err(SedError::InvalidTermCount { min: 1, got: 0 })
    } else {
        Ok(())
    }
}

/// Closed-form regression of `ln y` on `ln x`.
///
/// No samples, or a single distinct abscissa, give NaN.
fn log_log_regression(samples: &[(f64, f64)]) -> PowerLawFit {
    if samples.is_empty() {
        return PowerLawFit::nan();
    }
    let n = samples.len() as f64;
    let mean_x = samples.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = samples.iter().map(|(_, y)| y).sum::<f64>() / n;
    let (sxy, sxx) = samples.iter().fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });
    let exponent = sxy / sxx;
    PowerLawFit {
        factor: (mean_y - exponent * mean_x).exp(),
        exponent,
    }
}

impl MeasuredSed {
    /// `(frequency / scale, flux)` of every sample with a finite flux.
    fn finite_samples(&self, polarization: Polarization, scale: f64) -> Vec<(f64, f64)> {
        self.measurements()
            .map(|m| (m.frequency_hz() / scale, m.flux(polarization)))
            .filter(|(_, flux)| flux.is_finite())
            .collect()
    }

    /// `(ln frequency, ln flux)` of finite samples, or `None` as soon as any
    /// flux is non-positive.
    fn log_log_samples(&self, polarization: Polarization) -> Option<Vec<(f64, f64)>> {
        let mut samples = Vec::with_capacity(self.measurement_count());
        for m in self.measurements() {
            let flux = m.flux(polarization);
            if flux <= 0.0 {
                return None;
            }
            if flux.is_finite() {
                samples.push((m.frequency_hz().ln(), flux.ln()));
            }
        }
        Some(samples)
    }

    /// Fit `flux = factor · frequency^exponent` to `polarization`.
    pub fn fit_power_law(&self, polarization: Polarization) -> PowerLawFit {
        self.fit_power_law_with(polarization, &LevenbergMarquardt::default())
    }

    pub fn fit_power_law_with<F>(&self, polarization: Polarization, fitter: &F) -> PowerLawFit
    where
        F: NonLinearFitter + ?Sized,
    {
        match self.log_log_samples(polarization) {
            Some(samples) => {
                debug!(%polarization, samples = samples.len(), "power-law fit: log-log regression");
                log_log_regression(&samples)
            }
            None => {
                let samples = self.finite_samples(polarization, 1.0);
                debug!(
                    %polarization,
                    samples = samples.len(),
                    "power-law fit: non-positive flux, non-linear path"
                );
                fitter.fit_power_law(&samples, PowerLawFit::SEED)
            }
        }
    }

    /// Fit `flux = a · frequency^(b + c·ln frequency)` to `polarization`.
    pub fn fit_power_law_2nd_order(&self, polarization: Polarization) -> CurvedPowerLawFit {
        self.fit_power_law_2nd_order_with(polarization, &LevenbergMarquardt::default())
    }

    pub fn fit_power_law_2nd_order_with<F>(
        &self,
        polarization: Polarization,
        fitter: &F,
    ) -> CurvedPowerLawFit
    where
        F: NonLinearFitter + ?Sized,
    {
        let samples = self.finite_samples(polarization, 1.0);
        fitter.fit_curved_power_law(&samples, CurvedPowerLawFit::SEED)
    }

    /// Fit `flux = exp(Σ c_k ln(f/ref)^k)` with `n_terms` coefficients.
    pub fn fit_log_polynomial(
        &self,
        n_terms: usize,
        polarization: Polarization,
        reference_frequency_hz: f64,
    ) -> Result<Vec<f64>, SedError> {
        self.fit_log_polynomial_with(
            n_terms,
            polarization,
            reference_frequency_hz,
            &LevenbergMarquardt::default(),
        )
    }

    pub fn fit_log_polynomial_with<F>(
        &self,
        n_terms: usize,
        polarization: Polarization,
        reference_frequency_hz: f64,
        fitter: &F,
    ) -> Result<Vec<f64>, SedError>
    where
        F: NonLinearFitter + ?Sized,
    {
        validate_terms(n_terms)?;
        validate_reference(reference_frequency_hz)?;
        let samples = self.finite_samples(polarization, reference_frequency_hz);
        Ok(fitter.fit_log_polynomial(&samples, &vec![0.0; n_terms]))
    }

    /// Weighted linear least-squares polynomial of flux in `f / ref`.
    ///
    /// Samples with a positive standard deviation are weighted by `1/σ²`,
    /// the rest by 1.
    pub fn fit_polynomial(
        &self,
        n_terms: usize,
        polarization: Polarization,
        reference_frequency_hz: f64,
    ) -> Result<Vec<f64>, SedError> {
        validate_terms(n_terms)?;
        validate_reference(reference_frequency_hz)?;
        let mut fitter = PolynomialFitter::new();
        for m in self.measurements() {
            let weight = match m.flux_stddev(polarization) {
                Some(sigma) if sigma.is_finite() && sigma > 0.0 => 1.0 / (sigma * sigma),
                _ => 1.0,
            };
            let x = m.frequency_hz() / reference_frequency_hz;
            fitter.add_data_point(x, m.flux(polarization), weight);
        }
        Ok(fitter.fit(n_terms))
    }

    /// Compress into a logarithmic [`AnalyticSed`] at `reference_frequency_hz`.
    ///
    /// Stokes I is fitted with `n_terms` log-polynomial coefficients; the
    /// first becomes the reference flux, the others the spectral terms.
    /// Q, U and V keep their evaluated flux at the reference frequency.
    pub fn to_analytic(
        &self,
        n_terms: usize,
        reference_frequency_hz: f64,
    ) -> Result<AnalyticSed, SedError> {
        self.to_analytic_with(n_terms, reference_frequency_hz, &LevenbergMarquardt::default())
    }

    pub fn to_analytic_with<F>(
        &self,
        n_terms: usize,
        reference_frequency_hz: f64,
        fitter: &F,
    ) -> Result<AnalyticSed, SedError>
    where
        F: NonLinearFitter + ?Sized,
    {
        let coefficients =
            self.fit_log_polynomial_with(n_terms, Polarization::I, reference_frequency_hz, fitter)?;
        let mut reference_flux = [0.0; 4];
        for pol in Polarization::ALL {
            reference_flux[pol.index()] = self.flux_at_frequency(reference_frequency_hz, pol);
        }
        reference_flux[Polarization::I.index()] = coefficients[0].exp();
        AnalyticSed::new(
            reference_frequency_hz,
            reference_flux,
            coefficients[1..].to_vec(),
            true,
        )
    }
}

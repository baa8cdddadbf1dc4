//! A single flux-density sample of a component.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::domain::Polarization;
use crate::error::SedError;

/// Flux densities of all four Stokes channels at one frequency.
///
/// The frequency is the sample's identity inside a [`MeasuredSed`] and is
/// fixed at construction; fluxes can be changed in place.
///
/// [`MeasuredSed`]: crate::sed::MeasuredSed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    frequency_hz: f64,
    bandwidth_hz: Option<f64>,
    /// Flux densities [Jy], indexed by `Polarization::index`.
    flux: [f64; 4],
    /// One-sigma uncertainties [Jy], when the source catalog provides them.
    flux_stddev: [Option<f64>; 4],
}

impl Measurement {
    /// A zero-flux measurement at `frequency_hz`.
    pub fn new(frequency_hz: f64) -> Self {
        Self {
            frequency_hz,
            bandwidth_hz: None,
            flux: [0.0; 4],
            flux_stddev: [None; 4],
        }
    }

    pub fn with_fluxes(frequency_hz: f64, flux: [f64; 4]) -> Self {
        Self {
            flux,
            ..Self::new(frequency_hz)
        }
    }

    /// A measurement where only `polarization` carries flux.
    pub fn single_polarization(frequency_hz: f64, polarization: Polarization, flux: f64) -> Self {
        let mut m = Self::new(frequency_hz);
        m.set_zero_except(polarization, flux);
        m
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    pub fn bandwidth_hz(&self) -> Option<f64> {
        self.bandwidth_hz
    }

    /// Set the bandwidth. Zero, negative or non-finite values clear it.
    pub fn set_bandwidth_hz(&mut self, bandwidth_hz: f64) {
        self.bandwidth_hz =
            (bandwidth_hz.is_finite() && bandwidth_hz > 0.0).then_some(bandwidth_hz);
    }

    pub fn flux(&self, polarization: Polarization) -> f64 {
        self.flux[polarization.index()]
    }

    pub fn fluxes(&self) -> [f64; 4] {
        self.flux
    }

    pub fn flux_from_index(&self, index: usize) -> Result<f64, SedError> {
        Ok(self.flux(Polarization::from_index(index)?))
    }

    pub fn set_flux(&mut self, polarization: Polarization, flux: f64) {
        self.flux[polarization.index()] = flux;
    }

    pub fn set_flux_from_index(&mut self, index: usize, flux: f64) -> Result<(), SedError> {
        self.set_flux(Polarization::from_index(index)?, flux);
        Ok(())
    }

    pub fn set_zero_except(&mut self, polarization: Polarization, flux: f64) {
        self.flux = [0.0; 4];
        self.set_flux(polarization, flux);
    }

    pub fn flux_stddev(&self, polarization: Polarization) -> Option<f64> {
        self.flux_stddev[polarization.index()]
    }

    pub fn set_flux_stddev(&mut self, polarization: Polarization, stddev: f64) {
        self.flux_stddev[polarization.index()] = Some(stddev);
    }

    pub fn set_flux_stddev_from_index(
        &mut self,
        index: usize,
        stddev: f64,
    ) -> Result<(), SedError> {
        self.set_flux_stddev(Polarization::from_index(index)?, stddev);
        Ok(())
    }

    /// Multiply every channel by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.flux {
            *v *= factor;
        }
    }

    /// Blend each channel as `self * (1 - weight) + other * weight`.
    ///
    /// Frequency, bandwidth and uncertainties of `self` are kept.
    pub fn average_with(&mut self, other: &Measurement, weight: f64) {
        for (mine, theirs) in self.flux.iter_mut().zip(other.flux.iter()) {
            *mine = *mine * (1.0 - weight) + theirs * weight;
        }
    }

    /// True when all four channels are finite.
    pub fn is_valid(&self) -> bool {
        self.flux.iter().all(|v| v.is_finite())
    }

    /// True when at least one channel is finite.
    pub fn has_finite_flux(&self) -> bool {
        self.flux.iter().any(|v| v.is_finite())
    }
}

impl AddAssign<&Measurement> for Measurement {
    fn add_assign(&mut self, rhs: &Measurement) {
        for (mine, theirs) in self.flux.iter_mut().zip(rhs.flux.iter()) {
            *mine += theirs;
        }
    }
}

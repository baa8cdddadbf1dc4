//! Sky-model components and their single SED.
//!
//! A component owns at most one SED. It is either set once, whole, or grown
//! sample by sample into a measured SED; mixing the two is an error.

use serde::{Deserialize, Serialize};

use crate::domain::{Measurement, Polarization};
use crate::error::SedError;
use crate::sed::{MeasuredSed, Sed, SpectralModel};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SedComponent {
    name: String,
    sed: Option<Sed>,
}

impl SedComponent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sed: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sed(&self) -> Option<&Sed> {
        self.sed.as_ref()
    }

    pub fn has_sed(&self) -> bool {
        self.sed.is_some()
    }

    /// Attach an SED. Fails if one is already present.
    pub fn set_sed(&mut self, sed: impl Into<Sed>) -> Result<(), SedError> {
        if self.sed.is_some() {
            return Err(SedError::SedAlreadySet);
        }
        self.sed = Some(sed.into());
        Ok(())
    }

    /// Append a sample, creating a measured SED on first use.
    pub fn add_measurement(&mut self, measurement: Measurement) -> Result<(), SedError> {
        match &mut self.sed {
            Some(Sed::Measured(sed)) => sed.add_measurement(measurement),
            Some(Sed::Analytic(_)) => Err(SedError::MeasurementOnAnalyticSed),
            None => {
                let mut sed = MeasuredSed::new();
                sed.add_measurement(measurement)?;
                self.sed = Some(Sed::Measured(sed));
                Ok(())
            }
        }
    }

    /// Flux density [Jy] at `frequency_hz`; `None` without an SED.
    pub fn flux_at_frequency(&self, frequency_hz: f64, polarization: Polarization) -> Option<f64> {
        self.sed
            .as_ref()
            .map(|sed| sed.flux_at_frequency(frequency_hz, polarization))
    }

    /// Mean flux density [Jy] over a band; `None` without an SED.
    pub fn integrated_flux(
        &self,
        start_hz: f64,
        end_hz: f64,
        polarization: Polarization,
    ) -> Option<f64> {
        self.sed
            .as_ref()
            .map(|sed| sed.integrated_flux(start_hz, end_hz, polarization))
    }
}

//! Fitting many independent SEDs at once.

use rayon::prelude::*;
use tracing::debug;

use crate::domain::Polarization;
use crate::fit::{NonLinearFitter, PowerLawFit};
use crate::sed::MeasuredSed;

/// Power-law fit of `polarization` for every SED, in parallel.
///
/// Results are in input order. SEDs share nothing, so the only requirement is
/// that the fitter can be used from several threads.
pub fn fit_power_laws<F>(
    seds: &[MeasuredSed],
    polarization: Polarization,
    fitter: &F,
) -> Vec<PowerLawFit>
where
    F: NonLinearFitter + Sync + ?Sized,
{
    let fits: Vec<PowerLawFit> = seds
        .par_iter()
        .map(|sed| sed.fit_power_law_with(polarization, fitter))
        .collect();
    debug!(
        seds = seds.len(),
        failed = fits.iter().filter(|fit| !fit.is_finite()).count(),
        "batch power-law fit finished"
    );
    fits
}

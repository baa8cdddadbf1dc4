//! Reporting utilities: brightness rankings and text rendering.

pub mod format;

pub use format::*;

use std::cmp::Ordering;

use crate::component::SedComponent;
use crate::domain::Polarization;
use crate::sed::MeasuredSed;

/// Indices sorted by descending key; missing and NaN keys go last, ties keep
/// input order.
fn rank_by_key(keys: &[Option<f64>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    let key = |i: usize| keys[i].filter(|v| !v.is_nan());
    order.sort_by(|&a, &b| match (key(a), key(b)) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    order
}

/// Indices of `seds`, brightest first.
///
/// Every SED is evaluated in Stokes I at the lowest frequency sampled by any
/// of them, the frequency [`MeasuredSed::compare_brightness`] uses for a
/// pair. Empty SEDs go last.
pub fn rank_by_brightness(seds: &[MeasuredSed]) -> Vec<usize> {
    let Some(frequency_hz) = seds
        .iter()
        .filter_map(MeasuredSed::lowest_frequency)
        .min_by(f64::total_cmp)
    else {
        return (0..seds.len()).collect();
    };
    let keys: Vec<Option<f64>> = seds
        .iter()
        .map(|sed| (!sed.is_empty()).then(|| sed.flux_at_frequency(frequency_hz, Polarization::I)))
        .collect();
    rank_by_key(&keys)
}

/// Indices of `components` by Stokes I at `frequency_hz`, brightest first.
/// Components without an SED go last.
pub fn rank_components(components: &[SedComponent], frequency_hz: f64) -> Vec<usize> {
    let keys: Vec<Option<f64>> = components
        .iter()
        .map(|c| c.flux_at_frequency(frequency_hz, Polarization::I))
        .collect();
    rank_by_key(&keys)
}

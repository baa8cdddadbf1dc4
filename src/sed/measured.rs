//! Sampled spectral energy distributions.
//!
//! A [`MeasuredSed`] is a set of [`Measurement`]s with unique frequencies,
//! kept in ascending frequency order. Between two samples the spectrum is the
//! power law through them (see [`crate::math::power_law`]); outside the
//! sampled range it is the power law through the lowest and highest samples.
//!
//! Band integration walks the samples overlapping the band, averages each
//! piece analytically and returns the width-weighted mean over the band.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::ops::{AddAssign, MulAssign};

use serde::{Deserialize, Serialize};

use crate::domain::{Measurement, Polarization};
use crate::error::SedError;
use crate::math::{SpectralPoint, flux_at, segment_mean};
use crate::sed::{NonFiniteSegment, SpectralModel, log_non_finite_segment};

/// Offset of the second sample placed by [`MeasuredSed::add_spectral_index`].
pub const SPECTRAL_INDEX_OFFSET_HZ: f64 = 15e6;

/// Weight of the incoming SED in [`MeasuredSed::combine_measurements_with_averaging`]
/// when callers have no preference.
pub const DEFAULT_AVERAGING_WEIGHT: f64 = 0.5;

/// Frequency as a totally ordered map key.
///
/// Stored frequencies are always finite and positive, so `total_cmp` agrees
/// with the numeric order.
#[derive(Debug, Clone, Copy)]
struct FrequencyKey(f64);

impl PartialEq for FrequencyKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrequencyKey {}

impl PartialOrd for FrequencyKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrequencyKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn validate_frequency(frequency_hz: f64) -> Result<FrequencyKey, SedError> {
    if frequency_hz.is_finite() && frequency_hz > 0.0 {
        Ok(FrequencyKey(frequency_hz))
    } else {
        Err(SedError::InvalidFrequency { frequency_hz })
    }
}

fn point(measurement: &Measurement, polarization: Polarization) -> SpectralPoint {
    SpectralPoint::new(measurement.frequency_hz(), measurement.flux(polarization))
}

/// Flux samples of one component, ordered by frequency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Measurement>", try_from = "Vec<Measurement>")]
pub struct MeasuredSed {
    measurements: BTreeMap<FrequencyKey, Measurement>,
}

impl MeasuredSed {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single Stokes I sample.
    pub fn from_flux(flux_jy: f64, frequency_hz: f64) -> Result<Self, SedError> {
        let mut sed = Self::new();
        sed.add_flux(flux_jy, frequency_hz)?;
        Ok(sed)
    }

    /// A single sample with all four Stokes fluxes.
    pub fn from_fluxes(fluxes: [f64; 4], frequency_hz: f64) -> Result<Self, SedError> {
        let mut sed = Self::new();
        sed.add_measurement(Measurement::with_fluxes(frequency_hz, fluxes))?;
        Ok(sed)
    }

    /// A power law of `spectral_index` through `flux_jy` at `frequency_hz`,
    /// see [`MeasuredSed::add_spectral_index`].
    pub fn from_spectral_index(
        flux_jy: f64,
        frequency_hz: f64,
        spectral_index: f64,
        polarization: Polarization,
    ) -> Result<Self, SedError> {
        let mut sed = Self::new();
        sed.add_spectral_index(flux_jy, frequency_hz, spectral_index, polarization)?;
        Ok(sed)
    }

    /// Two Stokes I samples, i.e. the power law through them.
    pub fn from_two_points(
        flux_a_jy: f64,
        frequency_a_hz: f64,
        flux_b_jy: f64,
        frequency_b_hz: f64,
    ) -> Result<Self, SedError> {
        let mut sed = Self::from_flux(flux_a_jy, frequency_a_hz)?;
        sed.add_flux(flux_b_jy, frequency_b_hz)?;
        Ok(sed)
    }

    /// Insert a sample. Its frequency must be finite, positive and not yet present.
    pub fn add_measurement(&mut self, measurement: Measurement) -> Result<(), SedError> {
        let key = validate_frequency(measurement.frequency_hz())?;
        match self.measurements.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(measurement);
                Ok(())
            }
            Entry::Occupied(_) => Err(SedError::DuplicateFrequency {
                frequency_hz: key.0,
            }),
        }
    }

    /// Insert a Stokes I only sample.
    pub fn add_flux(&mut self, flux_jy: f64, frequency_hz: f64) -> Result<(), SedError> {
        self.add_measurement(Measurement::single_polarization(
            frequency_hz,
            Polarization::I,
            flux_jy,
        ))
    }

    /// Encode a power law as samples of `polarization`.
    ///
    /// Adds `flux_jy` at `frequency_hz` and, for a non-zero index, a second
    /// sample [`SPECTRAL_INDEX_OFFSET_HZ`] higher (or at twice the frequency if
    /// the offset is lost to rounding). Either both samples are added or none.
    pub fn add_spectral_index(
        &mut self,
        flux_jy: f64,
        frequency_hz: f64,
        spectral_index: f64,
        polarization: Polarization,
    ) -> Result<(), SedError> {
        let first = Measurement::single_polarization(frequency_hz, polarization, flux_jy);
        if spectral_index == 0.0 {
            return self.add_measurement(first);
        }

        let key = validate_frequency(frequency_hz)?;
        let mut second_hz = frequency_hz + SPECTRAL_INDEX_OFFSET_HZ;
        if second_hz == frequency_hz {
            second_hz = frequency_hz * 2.0;
        }
        let second_key = validate_frequency(second_hz)?;
        for k in [key, second_key] {
            if self.measurements.contains_key(&k) {
                return Err(SedError::DuplicateFrequency { frequency_hz: k.0 });
            }
        }

        let second_flux = flux_jy * (second_hz / frequency_hz).powf(spectral_index);
        self.measurements.insert(key, first);
        self.measurements.insert(
            second_key,
            Measurement::single_polarization(second_hz, polarization, second_flux),
        );
        Ok(())
    }

    pub fn measurement_count(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Samples in ascending frequency order.
    pub fn measurements(
        &self,
    ) -> impl DoubleEndedIterator<Item = &Measurement> + ExactSizeIterator {
        self.measurements.values()
    }

    pub fn measurement_at(&self, frequency_hz: f64) -> Option<&Measurement> {
        self.measurements.get(&FrequencyKey(frequency_hz))
    }

    pub fn lowest_frequency(&self) -> Option<f64> {
        self.measurements.first_key_value().map(|(k, _)| k.0)
    }

    pub fn highest_frequency(&self) -> Option<f64> {
        self.measurements.last_key_value().map(|(k, _)| k.0)
    }

    /// Midpoint of the sampled range.
    pub fn centre_frequency(&self) -> Option<f64> {
        Some(0.5 * (self.lowest_frequency()? + self.highest_frequency()?))
    }

    /// Stokes I flux of the lowest-frequency sample.
    pub fn flux_at_lowest_frequency(&self) -> Option<f64> {
        self.measurements
            .first_key_value()
            .map(|(_, m)| m.flux(Polarization::I))
    }

    /// [`MeasuredSed::centre_frequency`], NaN for an empty SED.
    pub fn reference_frequency_hz(&self) -> f64 {
        self.centre_frequency().unwrap_or(f64::NAN)
    }

    /// Lowest and highest samples of `polarization`; these define the
    /// extrapolation law.
    fn full_range(&self, polarization: Polarization) -> Option<(SpectralPoint, SpectralPoint)> {
        let (_, first) = self.measurements.first_key_value()?;
        let (_, last) = self.measurements.last_key_value()?;
        Some((point(first, polarization), point(last, polarization)))
    }

    /// Flux density [Jy] of `polarization` at `frequency_hz`.
    ///
    /// Empty SEDs give 0, a single sample is flat, an exact sample frequency
    /// returns that sample, anything else follows the power law of the
    /// enclosing samples (or of the full range outside it).
    pub fn flux_at_frequency(&self, frequency_hz: f64, polarization: Polarization) -> f64 {
        let Some((first, last)) = self.full_range(polarization) else {
            return 0.0;
        };
        if self.measurements.len() == 1 {
            return first.flux;
        }

        let key = FrequencyKey(frequency_hz);
        let Some((upper_key, upper)) = self.measurements.range(key..).next() else {
            return flux_at(first, last, frequency_hz);
        };
        if upper_key.0 == frequency_hz {
            return upper.flux(polarization);
        }
        match self.measurements.range(..key).next_back() {
            Some((_, lower)) => flux_at(
                point(lower, polarization),
                point(upper, polarization),
                frequency_hz,
            ),
            None => flux_at(first, last, frequency_hz),
        }
    }

    pub fn flux_at_frequency_from_index(
        &self,
        frequency_hz: f64,
        index: usize,
    ) -> Result<f64, SedError> {
        Ok(self.flux_at_frequency(frequency_hz, Polarization::from_index(index)?))
    }

    /// Mean flux density [Jy] over `[start_hz, end_hz]`.
    ///
    /// Non-finite segment means are kept in the result and logged through
    /// [`log_non_finite_segment`].
    pub fn integrated_flux(&self, start_hz: f64, end_hz: f64, polarization: Polarization) -> f64 {
        self.integrated_flux_with(start_hz, end_hz, polarization, &mut log_non_finite_segment)
    }

    /// [`MeasuredSed::integrated_flux`] with a caller-supplied sink for
    /// non-finite segments. Reversed bounds are swapped.
    pub fn integrated_flux_with<F>(
        &self,
        start_hz: f64,
        end_hz: f64,
        polarization: Polarization,
        sink: &mut F,
    ) -> f64
    where
        F: FnMut(&NonFiniteSegment),
    {
        let (start_hz, end_hz) = if start_hz <= end_hz {
            (start_hz, end_hz)
        } else {
            (end_hz, start_hz)
        };
        if start_hz == end_hz {
            return self.flux_at_frequency(start_hz, polarization);
        }
        let Some((first, last)) = self.full_range(polarization) else {
            return 0.0;
        };
        match self.measurements.len() {
            1 => return first.flux,
            2 => return segment_mean(first, last, start_hz, end_hz),
            _ => {}
        }

        // Start at the last sample below the band, else at the first inside it.
        let start_key = FrequencyKey(start_hz);
        let Some((&first_inside, _)) = self.measurements.range(start_key..).next() else {
            return segment_mean(first, last, start_hz, end_hz);
        };
        let walk_from = self
            .measurements
            .range(..start_key)
            .next_back()
            .map_or(first_inside, |(k, _)| *k);
        if walk_from.0 >= end_hz {
            return segment_mean(first, last, start_hz, end_hz);
        }

        let mut piece = |a: SpectralPoint, b: SpectralPoint, lo: f64, hi: f64| -> f64 {
            let mean = segment_mean(a, b, lo, hi);
            if !mean.is_finite() {
                sink(&NonFiniteSegment {
                    polarization,
                    start_hz: lo,
                    end_hz: hi,
                    a,
                    b,
                    mean,
                });
            }
            mean * (hi - lo)
        };

        let mut total = 0.0;
        let mut left_hz = start_hz;
        if left_hz < walk_from.0 {
            total += piece(first, last, left_hz, walk_from.0);
            left_hz = walk_from.0;
        }

        let mut walk = self
            .measurements
            .range(walk_from..)
            .map(|(_, m)| point(m, polarization))
            .peekable();
        while let Some(a) = walk.next() {
            if a.frequency_hz >= end_hz {
                break;
            }
            let (seg_a, seg_b, right_hz) = match walk.peek() {
                Some(&b) => (a, b, b.frequency_hz.min(end_hz)),
                None => (first, last, end_hz),
            };
            if left_hz < right_hz {
                total += piece(seg_a, seg_b, left_hz, right_hz);
                left_hz = right_hz;
            }
        }
        total / (end_hz - start_hz)
    }

    /// Mean of the finite fluxes of `polarization`; NaN when there are none.
    pub fn average_flux(&self, polarization: Polarization) -> f64 {
        self.average_flux_where(polarization, |_| true)
    }

    /// [`MeasuredSed::average_flux`] over samples with frequency in `[start_hz, end_hz)`.
    ///
    /// Equal bounds evaluate the SED at that frequency and an empty SED gives 0.
    pub fn average_flux_in_band(
        &self,
        start_hz: f64,
        end_hz: f64,
        polarization: Polarization,
    ) -> f64 {
        if start_hz == end_hz {
            return self.flux_at_frequency(start_hz, polarization);
        }
        if self.is_empty() {
            return 0.0;
        }
        self.average_flux_where(polarization, |f| f >= start_hz && f < end_hz)
    }

    fn average_flux_where(&self, polarization: Polarization, keep: impl Fn(f64) -> bool) -> f64 {
        let (sum, count) = self
            .measurements
            .values()
            .filter(|m| keep(m.frequency_hz()))
            .map(|m| m.flux(polarization))
            .filter(|v| v.is_finite())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }

    /// Merge the samples of `other`, which must not share any frequency with
    /// `self`. On error nothing is inserted.
    pub fn combine_measurements(&mut self, other: &MeasuredSed) -> Result<(), SedError> {
        let overlapping: Vec<f64> = other
            .measurements
            .keys()
            .filter(|k| self.measurements.contains_key(k))
            .map(|k| k.0)
            .collect();
        if let Some(&first_hz) = overlapping.first() {
            return Err(SedError::OverlappingFrequencies {
                count: overlapping.len(),
                first_hz,
            });
        }
        for (key, m) in &other.measurements {
            self.measurements.insert(*key, m.clone());
        }
        Ok(())
    }

    /// Merge the samples of `other`; where both have a sample at the same
    /// frequency the fluxes become `mine * (1 - weight) + theirs * weight`.
    pub fn combine_measurements_with_averaging(&mut self, other: &MeasuredSed, weight: f64) {
        for (key, m) in &other.measurements {
            match self.measurements.entry(*key) {
                Entry::Vacant(slot) => {
                    slot.insert(m.clone());
                }
                Entry::Occupied(mut slot) => slot.get_mut().average_with(m, weight),
            }
        }
    }

    /// Drop samples with any non-finite channel; returns how many were removed.
    pub fn remove_invalid_measurements(&mut self) -> usize {
        let before = self.measurements.len();
        self.measurements.retain(|_, m| m.is_valid());
        before - self.measurements.len()
    }

    /// True when any channel of any sample is finite.
    pub fn has_valid_measurement(&self) -> bool {
        self.measurements.values().any(Measurement::has_finite_flux)
    }

    /// Order by Stokes I at the lower of the two lowest frequencies.
    ///
    /// `None` if either SED is empty or a flux is NaN.
    pub fn compare_brightness(&self, other: &MeasuredSed) -> Option<Ordering> {
        let frequency_hz = self.lowest_frequency()?.min(other.lowest_frequency()?);
        let mine = self.flux_at_frequency(frequency_hz, Polarization::I);
        let theirs = other.flux_at_frequency(frequency_hz, Polarization::I);
        mine.partial_cmp(&theirs)
    }
}

impl SpectralModel for MeasuredSed {
    fn flux_at_frequency(&self, frequency_hz: f64, polarization: Polarization) -> f64 {
        MeasuredSed::flux_at_frequency(self, frequency_hz, polarization)
    }

    fn integrated_flux(&self, start_hz: f64, end_hz: f64, polarization: Polarization) -> f64 {
        MeasuredSed::integrated_flux(self, start_hz, end_hz, polarization)
    }

    fn reference_frequency_hz(&self) -> f64 {
        MeasuredSed::reference_frequency_hz(self)
    }
}

/// Add the other model's flux, evaluated at each of this SED's frequencies.
impl<T: SpectralModel + ?Sized> AddAssign<&T> for MeasuredSed {
    fn add_assign(&mut self, rhs: &T) {
        for (key, m) in self.measurements.iter_mut() {
            for pol in Polarization::ALL {
                m.set_flux(pol, m.flux(pol) + rhs.flux_at_frequency(key.0, pol));
            }
        }
    }
}

impl MulAssign<f64> for MeasuredSed {
    fn mul_assign(&mut self, factor: f64) {
        for m in self.measurements.values_mut() {
            m.scale(factor);
        }
    }
}

impl TryFrom<Vec<Measurement>> for MeasuredSed {
    type Error = SedError;

    fn try_from(measurements: Vec<Measurement>) -> Result<Self, Self::Error> {
        let mut sed = Self::new();
        for m in measurements {
            sed.add_measurement(m)?;
        }
        Ok(sed)
    }
}

impl From<MeasuredSed> for Vec<Measurement> {
    fn from(sed: MeasuredSed) -> Self {
        sed.measurements.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LN_2: f64 = std::f64::consts::LN_2;

    /// S = 1e9 / ν sampled at 100, 200 and 400 MHz.
    fn inverse_sed() -> MeasuredSed {
        let mut sed = MeasuredSed::new();
        for f in [100e6, 200e6, 400e6] {
            sed.add_flux(1e9 / f, f).unwrap();
        }
        sed
    }

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol * expected.abs().max(1.0),
            "actual={actual} expected={expected}"
        );
    }

    #[test]
    fn empty_sed_is_zero_everywhere() {
        let sed = MeasuredSed::new();
        assert_eq!(sed.flux_at_frequency(150e6, Polarization::I), 0.0);
        assert_eq!(sed.integrated_flux(100e6, 200e6, Polarization::I), 0.0);
        assert!(sed.reference_frequency_hz().is_nan());
        assert!(sed.average_flux(Polarization::I).is_nan());
        assert!(!sed.has_valid_measurement());
    }

    #[test]
    fn single_sample_is_flat() {
        let sed = MeasuredSed::from_flux(3.0, 150e6).unwrap();
        assert_eq!(sed.flux_at_frequency(10e6, Polarization::I), 3.0);
        assert_eq!(sed.flux_at_frequency(1e9, Polarization::I), 3.0);
        assert_eq!(sed.integrated_flux(50e6, 500e6, Polarization::I), 3.0);
        assert_eq!(sed.flux_at_frequency(10e6, Polarization::Q), 0.0);
    }

    #[test]
    fn exact_sample_frequency_returns_the_sample() {
        let sed = inverse_sed();
        assert_eq!(sed.flux_at_frequency(200e6, Polarization::I), 5.0);
        assert_eq!(sed.flux_at_frequency(400e6, Polarization::I), 2.5);
    }

    #[test]
    fn interpolation_and_extrapolation_follow_power_laws() {
        let sed = inverse_sed();
        assert_close(sed.flux_at_frequency(150e6, Polarization::I), 1e9 / 150e6, 1e-12);
        assert_close(sed.flux_at_frequency(300e6, Polarization::I), 1e9 / 300e6, 1e-12);
        assert_close(sed.flux_at_frequency(50e6, Polarization::I), 20.0, 1e-12);
        assert_close(sed.flux_at_frequency(800e6, Polarization::I), 1.25, 1e-12);
    }

    #[test]
    fn extrapolation_uses_the_full_range() {
        // Kinked spectrum: flat then falling. Outside the range the law
        // through the lowest and highest samples applies.
        let mut sed = MeasuredSed::new();
        sed.add_flux(4.0, 100e6).unwrap();
        sed.add_flux(4.0, 200e6).unwrap();
        sed.add_flux(1.0, 400e6).unwrap();
        let alpha = (1.0f64 / 4.0).ln() / 4.0f64.ln();
        let expected = 4.0 * (800e6f64 / 100e6).powf(alpha);
        assert_close(sed.flux_at_frequency(800e6, Polarization::I), expected, 1e-12);
    }

    #[test]
    fn integration_inside_one_segment_is_the_analytic_mean() {
        let sed = inverse_sed();
        // ∫ 1e9/ν dν over [100, 200] MHz / 100 MHz = 10 ln 2
        assert_close(sed.integrated_flux(100e6, 200e6, Polarization::I), 10.0 * LN_2, 1e-12);
    }

    #[test]
    fn two_samples_define_one_power_law() {
        let sed = MeasuredSed::from_two_points(10.0, 100e6, 5.0, 200e6).unwrap();
        assert_eq!(sed.flux_at_frequency(100e6, Polarization::I), 10.0);
        assert_eq!(sed.flux_at_frequency(200e6, Polarization::I), 5.0);

        let mid = sed.flux_at_frequency(150e6, Polarization::I);
        assert!(mid > 5.0 && mid < 10.0, "mid={mid}");
        assert_close(mid, 1e9 / 150e6, 1e-12);
        assert_close(sed.flux_at_frequency(50e6, Polarization::I), 20.0, 1e-12);

        let mean = sed.integrated_flux(100e6, 200e6, Polarization::I);
        assert_close(mean, 10.0 * LN_2, 1e-12);
        assert!((mean - 7.5).abs() > 0.1);
        let wide = sed.integrated_flux(50e6, 400e6, Polarization::I);
        assert_close(wide, 1e9 * 8f64.ln() / 350e6, 1e-12);
    }

    #[test]
    fn band_starting_at_zero_hz_has_a_finite_mean() {
        // S = (ν / 100 MHz)^-0.5; mean over [0, ν1] is 2 S(ν1)
        let mut sed = MeasuredSed::new();
        for f in [100e6f64, 200e6, 300e6] {
            sed.add_flux((f / 100e6).powf(-0.5), f).unwrap();
        }
        let mean = sed.integrated_flux(0.0, 300e6, Polarization::I);
        assert_close(mean, 2.0 / 3f64.sqrt(), 1e-12);
        let two = MeasuredSed::from_two_points(1.0, 100e6, 0.5f64.sqrt(), 200e6).unwrap();
        assert_close(two.integrated_flux(0.0, 100e6, Polarization::I), 2.0, 1e-12);
    }

    #[test]
    fn integration_across_samples_and_outside_the_range() {
        let sed = inverse_sed();
        // The whole spectrum is one power law, so every band has the closed form.
        let expected = |lo: f64, hi: f64| 1e9 * (hi / lo).ln() / (hi - lo);
        let bands = [
            (150e6, 300e6),
            (50e6, 150e6),
            (250e6, 900e6),
            (10e6, 2e9),
            (500e6, 600e6),
            (20e6, 60e6),
        ];
        for (lo, hi) in bands {
            assert_close(sed.integrated_flux(lo, hi, Polarization::I), expected(lo, hi), 1e-10);
        }
    }

    #[test]
    fn zero_width_band_is_point_evaluation() {
        let sed = inverse_sed();
        assert_eq!(
            sed.integrated_flux(150e6, 150e6, Polarization::I),
            sed.flux_at_frequency(150e6, Polarization::I)
        );
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let sed = inverse_sed();
        assert_eq!(
            sed.integrated_flux(300e6, 150e6, Polarization::I),
            sed.integrated_flux(150e6, 300e6, Polarization::I)
        );
    }

    #[test]
    fn integration_of_a_flat_spectrum_is_the_flux() {
        let mut sed = MeasuredSed::new();
        for f in [100e6, 140e6, 180e6, 250e6] {
            sed.add_flux(2.0, f).unwrap();
        }
        assert_close(sed.integrated_flux(120e6, 220e6, Polarization::I), 2.0, 1e-12);
        assert_close(sed.integrated_flux(20e6, 900e6, Polarization::I), 2.0, 1e-12);
    }

    #[test]
    fn non_finite_segments_reach_the_sink_and_the_result() {
        let mut sed = inverse_sed();
        sed.add_flux(f64::INFINITY, 300e6).unwrap();
        let mut seen = Vec::new();
        let mut record = |s: &NonFiniteSegment| seen.push(*s);
        let mean = sed.integrated_flux_with(150e6, 350e6, Polarization::I, &mut record);
        assert!(!mean.is_finite());
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|s| !s.mean.is_finite()));
        assert!(seen.iter().all(|s| s.polarization == Polarization::I));
    }

    #[test]
    fn non_positive_flux_segments_are_linear() {
        let mut sed = MeasuredSed::new();
        sed.add_flux(-1.0, 100e6).unwrap();
        sed.add_flux(1.0, 200e6).unwrap();
        sed.add_flux(3.0, 300e6).unwrap();
        assert_close(sed.flux_at_frequency(150e6, Polarization::I), 0.0, 1e-12);
        assert_close(sed.integrated_flux(100e6, 200e6, Polarization::I), 0.0, 1e-12);
    }

    #[test]
    fn duplicate_and_invalid_frequencies_are_rejected() {
        let mut sed = MeasuredSed::from_flux(1.0, 100e6).unwrap();
        assert_eq!(
            sed.add_flux(2.0, 100e6),
            Err(SedError::DuplicateFrequency { frequency_hz: 100e6 })
        );
        assert!(matches!(
            sed.add_flux(2.0, f64::NAN),
            Err(SedError::InvalidFrequency { .. })
        ));
        assert!(sed.add_flux(2.0, -5.0).is_err());
        assert_eq!(sed.measurement_count(), 1);
        assert_eq!(sed.measurement_at(100e6).map(|m| m.flux(Polarization::I)), Some(1.0));
    }

    #[test]
    fn spectral_index_constructor_encodes_the_power_law() {
        let sed = MeasuredSed::from_spectral_index(2.0, 150e6, -0.7, Polarization::I).unwrap();
        assert_eq!(sed.measurement_count(), 2);
        assert_eq!(sed.highest_frequency(), Some(150e6 + SPECTRAL_INDEX_OFFSET_HZ));
        let expected = 2.0 * (300e6f64 / 150e6).powf(-0.7);
        assert_close(sed.flux_at_frequency(300e6, Polarization::I), expected, 1e-12);

        let flat = MeasuredSed::from_spectral_index(2.0, 150e6, 0.0, Polarization::Q).unwrap();
        assert_eq!(flat.measurement_count(), 1);
        assert_eq!(flat.flux_at_frequency(300e6, Polarization::Q), 2.0);
        assert_eq!(flat.flux_at_frequency(300e6, Polarization::I), 0.0);
    }

    #[test]
    fn spectral_index_on_a_huge_frequency_doubles_it() {
        let sed = MeasuredSed::from_spectral_index(1.0, 1e30, 1.0, Polarization::I).unwrap();
        assert_eq!(sed.highest_frequency(), Some(2e30));
        assert_close(sed.flux_at_frequency(2e30, Polarization::I), 2.0, 1e-12);
    }

    #[test]
    fn spectral_index_is_all_or_nothing() {
        let mut sed = MeasuredSed::from_flux(1.0, 165e6).unwrap();
        assert!(sed.add_spectral_index(2.0, 150e6, -0.7, Polarization::I).is_err());
        assert_eq!(sed.measurement_count(), 1);
    }

    #[test]
    fn reference_and_centre_frequency() {
        let sed = inverse_sed();
        assert_eq!(sed.lowest_frequency(), Some(100e6));
        assert_eq!(sed.highest_frequency(), Some(400e6));
        assert_eq!(sed.reference_frequency_hz(), 250e6);
        assert_eq!(sed.flux_at_lowest_frequency(), Some(10.0));
    }

    #[test]
    fn averages_skip_non_finite_samples() {
        let mut sed = inverse_sed();
        sed.add_flux(f64::NAN, 300e6).unwrap();
        assert_close(sed.average_flux(Polarization::I), (10.0 + 5.0 + 2.5) / 3.0, 1e-12);
        assert_close(sed.average_flux_in_band(150e6, 401e6, Polarization::I), 3.75, 1e-12);
        // Upper bound is exclusive.
        assert_eq!(sed.average_flux_in_band(150e6, 400e6, Polarization::I), 5.0);
        assert!(sed.average_flux_in_band(1e9, 2e9, Polarization::I).is_nan());
        assert_eq!(sed.average_flux_in_band(200e6, 200e6, Polarization::I), 5.0);
        assert_eq!(MeasuredSed::new().average_flux_in_band(1e8, 2e8, Polarization::I), 0.0);
    }

    #[test]
    fn strict_combine_rejects_overlap_atomically() {
        let mut sed = inverse_sed();
        let mut other = MeasuredSed::from_flux(1.0, 50e6).unwrap();
        other.add_flux(7.0, 200e6).unwrap();
        let err = sed.combine_measurements(&other).unwrap_err();
        assert_eq!(
            err,
            SedError::OverlappingFrequencies {
                count: 1,
                first_hz: 200e6
            }
        );
        assert_eq!(sed.measurement_count(), 3);
        assert!(sed.measurement_at(50e6).is_none());

        let disjoint = MeasuredSed::from_flux(1.0, 50e6).unwrap();
        sed.combine_measurements(&disjoint).unwrap();
        assert_eq!(sed.lowest_frequency(), Some(50e6));
    }

    #[test]
    fn averaging_combine_blends_overlapping_samples() {
        let mut sed = inverse_sed();
        let mut other = MeasuredSed::from_flux(9.0, 200e6).unwrap();
        other.add_flux(1.0, 800e6).unwrap();
        sed.combine_measurements_with_averaging(&other, DEFAULT_AVERAGING_WEIGHT);
        assert_eq!(sed.measurement_count(), 4);
        assert_eq!(sed.flux_at_frequency(200e6, Polarization::I), 7.0);
        assert_eq!(sed.flux_at_frequency(800e6, Polarization::I), 1.0);

        let mut weighted = inverse_sed();
        weighted.combine_measurements_with_averaging(&other, 0.25);
        assert_eq!(weighted.flux_at_frequency(200e6, Polarization::I), 6.0);

        let mut keep = inverse_sed();
        keep.combine_measurements_with_averaging(&other, 0.0);
        assert_eq!(keep.flux_at_frequency(200e6, Polarization::I), 5.0);
        let mut adopt = inverse_sed();
        adopt.combine_measurements_with_averaging(&other, 1.0);
        assert_eq!(adopt.flux_at_frequency(200e6, Polarization::I), 9.0);
    }

    #[test]
    fn add_assign_adds_the_other_model_at_own_frequencies() {
        let mut sed = inverse_sed();
        let other = MeasuredSed::from_two_points(1.0, 100e6, 1.0, 400e6).unwrap();
        sed += &other;
        assert_eq!(sed.measurement_count(), 3);
        assert_close(sed.flux_at_frequency(200e6, Polarization::I), 6.0, 1e-12);
        assert_eq!(sed.flux_at_frequency(200e6, Polarization::Q), 0.0);
    }

    #[test]
    fn scaling_multiplies_every_channel() {
        let mut sed = MeasuredSed::from_fluxes([2.0, 1.0, -1.0, 0.5], 150e6).unwrap();
        sed *= 3.0;
        let m = sed.measurement_at(150e6).unwrap();
        assert_eq!(m.fluxes(), [6.0, 3.0, -3.0, 1.5]);
    }

    #[test]
    fn remove_invalid_drops_partially_non_finite_samples() {
        let mut sed = inverse_sed();
        sed.add_measurement(Measurement::with_fluxes(300e6, [1.0, f64::NAN, 0.0, 0.0]))
            .unwrap();
        assert!(sed.has_valid_measurement());
        assert_eq!(sed.remove_invalid_measurements(), 1);
        assert_eq!(sed.measurement_count(), 3);

        let mut single = MeasuredSed::from_fluxes([1.0, 0.0, f64::INFINITY, 0.0], 1e8).unwrap();
        assert!(single.has_valid_measurement());
        single.remove_invalid_measurements();
        assert!(single.is_empty());

        let all_nan = MeasuredSed::from_fluxes([f64::NAN; 4], 1e8).unwrap();
        assert!(!all_nan.has_valid_measurement());
    }

    #[test]
    fn brightness_compares_at_the_common_lowest_frequency() {
        let bright = inverse_sed();
        let faint = MeasuredSed::from_flux(1.0, 300e6).unwrap();
        assert_eq!(bright.compare_brightness(&faint), Some(Ordering::Greater));
        assert_eq!(faint.compare_brightness(&bright), Some(Ordering::Less));
        assert_eq!(bright.compare_brightness(&MeasuredSed::new()), None);
    }

    #[test]
    fn polarization_index_is_checked() {
        let sed = inverse_sed();
        assert_eq!(sed.flux_at_frequency_from_index(200e6, 0).unwrap(), 5.0);
        assert!(matches!(
            sed.flux_at_frequency_from_index(200e6, 4),
            Err(SedError::InvalidPolarizationIndex { index: 4 })
        ));
    }

    #[test]
    fn serde_keeps_order_and_rejects_duplicates() {
        let sed = inverse_sed();
        let text = serde_json::to_string(&sed).unwrap();
        let back: MeasuredSed = serde_json::from_str(&text).unwrap();
        assert_eq!(back, sed);

        let dup = vec![Measurement::new(1e8), Measurement::new(1e8)];
        let text = serde_json::to_string(&dup).unwrap();
        assert!(serde_json::from_str::<MeasuredSed>(&text).is_err());
    }
}

//! Reporting of suspicious intermediate results.
//!
//! Band integration keeps non-finite segment means in its sum so that
//! corrupted inputs stay visible downstream. Each such segment is also handed
//! to a caller-supplied sink; [`log_non_finite_segment`] is the default sink
//! used by [`MeasuredSed::integrated_flux`].
//!
//! [`MeasuredSed::integrated_flux`]: crate::sed::MeasuredSed::integrated_flux

use tracing::warn;

use crate::domain::Polarization;
use crate::math::SpectralPoint;

/// A band-integration segment whose mean flux was NaN or infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonFiniteSegment {
    pub polarization: Polarization,
    pub start_hz: f64,
    pub end_hz: f64,
    /// Samples defining the segment's power law.
    pub a: SpectralPoint,
    pub b: SpectralPoint,
    pub mean: f64,
}

/// Default sink: a `tracing` warning with the segment as structured fields.
pub fn log_non_finite_segment(segment: &NonFiniteSegment) {
    warn!(
        polarization = %segment.polarization,
        start_hz = segment.start_hz,
        end_hz = segment.end_hz,
        freq_a = segment.a.frequency_hz,
        flux_a = segment.a.flux,
        freq_b = segment.b.frequency_hz,
        flux_b = segment.b.flux,
        mean = segment.mean,
        "integrating flux gave a non-finite result"
    );
}

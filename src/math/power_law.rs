//! Two-point spectral segments.
//!
//! Between two samples the spectrum is modelled as the power law through
//! both points, i.e. log(flux) linear in log(frequency). A power law cannot
//! pass through a non-positive flux, so such segments fall back to a straight
//! line in linear space.
//!
//! Numerical notes:
//! - The segment mean integrates `S(ν) = S_a (ν/ν_a)^α` analytically. For
//!   `β = α + 1 → 0` the usual `(t^β - s^β)/β` form cancels catastrophically,
//!   so it is written as `s^β · expm1(β ln(t/s)) / β`, which tends to
//!   `ln(t/s)` continuously and is exact at `α = -1`.

/// A flux density sample of one polarization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPoint {
    pub frequency_hz: f64,
    pub flux: f64,
}

impl SpectralPoint {
    pub fn new(frequency_hz: f64, flux: f64) -> Self {
        Self { frequency_hz, flux }
    }
}

/// Spectral index of the power law through `a` and `b`.
///
/// `None` when either flux is non-positive or the frequencies coincide.
pub fn spectral_index(a: SpectralPoint, b: SpectralPoint) -> Option<f64> {
    if a.flux > 0.0 && b.flux > 0.0 && a.frequency_hz != b.frequency_hz {
        Some((b.flux / a.flux).ln() / (b.frequency_hz / a.frequency_hz).ln())
    } else {
        None
    }
}

/// Flux at `frequency_hz` on the segment through `a` and `b`.
///
/// Works for interpolation and extrapolation alike.
pub fn flux_at(a: SpectralPoint, b: SpectralPoint, frequency_hz: f64) -> f64 {
    if frequency_hz == a.frequency_hz {
        return a.flux;
    }
    if frequency_hz == b.frequency_hz {
        return b.flux;
    }
    match spectral_index(a, b) {
        Some(alpha) => a.flux * (frequency_hz / a.frequency_hz).powf(alpha),
        None => linear_flux_at(a, b, frequency_hz),
    }
}

fn linear_flux_at(a: SpectralPoint, b: SpectralPoint, frequency_hz: f64) -> f64 {
    let span = b.frequency_hz - a.frequency_hz;
    if span == 0.0 {
        return 0.5 * (a.flux + b.flux);
    }
    a.flux + (b.flux - a.flux) * (frequency_hz - a.frequency_hz) / span
}

/// Mean of `t^alpha` over `[t0, t1]`; equal bounds give `t0^alpha`.
///
/// A band starting at zero has a finite mean only for `alpha > -1`.
pub fn power_law_mean(alpha: f64, t0: f64, t1: f64) -> f64 {
    if t0 == t1 {
        return t0.powf(alpha);
    }
    let beta = alpha + 1.0;
    if t0 == 0.0 && beta > 0.0 {
        return t1.powf(beta) / beta / t1;
    }
    let ln_lo = t0.ln();
    let ln_hi = t1.ln();
    let span = if beta == 0.0 {
        ln_hi - ln_lo
    } else {
        (beta * ln_lo).exp() * (beta * (ln_hi - ln_lo)).exp_m1() / beta
    };
    span / (t1 - t0)
}

/// Mean flux density over `[start_hz, end_hz]` of the segment through `a`
/// and `b`, i.e. `∫ S(ν) dν / (end - start)`.
///
/// Equal bounds evaluate the segment at that frequency.
pub fn segment_mean(a: SpectralPoint, b: SpectralPoint, start_hz: f64, end_hz: f64) -> f64 {
    if start_hz == end_hz {
        return flux_at(a, b, start_hz);
    }
    match spectral_index(a, b) {
        Some(alpha) => {
            a.flux * power_law_mean(alpha, start_hz / a.frequency_hz, end_hz / a.frequency_hz)
        }
        // A straight line averages to its value at the midpoint.
        None => linear_flux_at(a, b, 0.5 * (start_hz + end_hz)),
    }
}

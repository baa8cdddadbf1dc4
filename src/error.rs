//! Structural failures.
//!
//! Numeric degeneracies (no samples, non-positive flux, out-of-range
//! frequencies) are not errors: they produce sentinel values documented on
//! each operation. Everything here aborts the requested operation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SedError {
    #[error("a measurement at {frequency_hz} Hz already exists")]
    DuplicateFrequency { frequency_hz: f64 },

    #[error("cannot combine measurements: {count} frequencies overlap (first at {first_hz} Hz)")]
    OverlappingFrequencies { count: usize, first_hz: f64 },

    #[error("measurement frequency must be finite and > 0, got {frequency_hz}")]
    InvalidFrequency { frequency_hz: f64 },

    #[error("polarization index {index} is outside the Stokes set (0..4)")]
    InvalidPolarizationIndex { index: usize },

    #[error("unknown polarization '{0}', expected one of I, Q, U, V")]
    UnknownPolarization(String),

    #[error("component already has a spectral energy distribution")]
    SedAlreadySet,

    #[error("cannot add a measurement to a component with an analytic SED")]
    MeasurementOnAnalyticSed,

    #[error("reference frequency must be finite and > 0, got {frequency_hz}")]
    InvalidReferenceFrequency { frequency_hz: f64 },

    #[error("a fit needs at least {min} term(s), got {got}")]
    InvalidTermCount { min: usize, got: usize },

    #[error("invalid fitter configuration: {0}")]
    InvalidConfig(String),
}

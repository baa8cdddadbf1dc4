//! `sky-sed` library crate.
//!
//! Spectral energy distributions of sky-model components:
//!
//! - [`sed::MeasuredSed`]: sparse flux samples with power-law interpolation,
//!   extrapolation and analytic band integration
//! - [`sed::AnalyticSed`]: reference flux with spectral-index or polynomial terms
//! - fitting of samples to power laws, curved power laws and log-polynomials,
//!   through an injectable [`fit::NonLinearFitter`]
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod component;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;
pub mod report;
pub mod sed;

//! Non-linear fitting.
//!
//! Responsibilities:
//!
//! - fitter configuration (iteration cap, tolerance, damping)
//! - the injectable [`NonLinearFitter`] capability and its Levenberg–Marquardt
//!   implementation
//! - parallel fitting of many SEDs

pub mod batch;
pub mod config;
pub mod fitter;

pub use batch::*;
pub use config::*;
pub use fitter::*;

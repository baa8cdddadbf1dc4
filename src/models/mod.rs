//! Parametric spectral forms.
//!
//! Each form is a pair of plain functions of `(x, params)`, prediction and
//! Jacobian row, so the fitter stays generic over them.

pub mod model;

pub use model::*;

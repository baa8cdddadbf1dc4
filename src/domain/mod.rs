//! Domain types shared by every SED representation.
//!
//! This module defines:
//!
//! - the closed Stokes channel set (`Polarization`)
//! - single flux-density samples (`Measurement`)

pub mod measurement;
pub mod polarization;

pub use measurement::*;
pub use polarization::*;

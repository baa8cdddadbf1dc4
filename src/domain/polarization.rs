//! The closed set of Stokes channels a measurement stores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SedError;

/// One of the four Stokes parameters.
///
/// The discriminant is the fixed storage slot used by every per-polarization
/// array in the crate (`I = 0`, `Q = 1`, `U = 2`, `V = 3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarization {
    I = 0,
    Q = 1,
    U = 2,
    V = 3,
}

impl Polarization {
    pub const ALL: [Polarization; 4] = [
        Polarization::I,
        Polarization::Q,
        Polarization::U,
        Polarization::V,
    ];

    /// Storage slot of this channel.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self, SedError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(SedError::InvalidPolarizationIndex { index })
    }

    pub fn name(self) -> &'static str {
        match self {
            Polarization::I => "I",
            Polarization::Q => "Q",
            Polarization::U => "U",
            Polarization::V => "V",
        }
    }
}

impl TryFrom<usize> for Polarization {
    type Error = SedError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index)
    }
}

impl FromStr for Polarization {
    type Err = SedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "I" | "STOKESI" => Ok(Polarization::I),
            "Q" | "STOKESQ" => Ok(Polarization::Q),
            "U" | "STOKESU" => Ok(Polarization::U),
            "V" | "STOKESV" => Ok(Polarization::V),
            _ => Err(SedError::UnknownPolarization(s.to_string())),
        }
    }
}

impl fmt::Display for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

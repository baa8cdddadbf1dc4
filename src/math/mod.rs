//! Mathematical utilities: least squares, polynomials and power-law segments.

pub mod ols;
pub mod polynomial;
pub mod power_law;

pub use ols::*;
pub use polynomial::*;
pub use power_law::*;

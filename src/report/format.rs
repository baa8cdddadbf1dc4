//! Text rendering of SEDs.
//!
//! `Display` writes the blocks of the sky-model text format, indented as
//! they appear inside a component:
//!
//! ```text
//!     measurement {
//!       frequency 150 MHz
//!       fluxdensity Jy 2.5 0 0 0
//!       bandwidth 1000000 Hz
//!     }
//!     sed {
//!       frequency 150 MHz
//!       fluxdensity Jy 2.5 0 0 0
//!       spectral-index { -0.7 -0.1 }
//!     }
//! ```
//!
//! Numbers use Rust's shortest round-trip formatting so the text parses back
//! to the same values.

use std::fmt;

use crate::component::SedComponent;
use crate::domain::{Measurement, Polarization};
use crate::report::rank_components;
use crate::sed::{AnalyticSed, MeasuredSed, Sed};

const HZ_PER_MHZ: f64 = 1e6;

fn write_fluxes(f: &mut fmt::Formatter<'_>, fluxes: [f64; 4]) -> fmt::Result {
    writeln!(
        f,
        "      fluxdensity Jy {} {} {} {}",
        fluxes[0], fluxes[1], fluxes[2], fluxes[3]
    )
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    measurement {{")?;
        writeln!(f, "      frequency {} MHz", self.frequency_hz() / HZ_PER_MHZ)?;
        write_fluxes(f, self.fluxes())?;
        if let Some(bandwidth_hz) = self.bandwidth_hz() {
            writeln!(f, "      bandwidth {bandwidth_hz} Hz")?;
        }
        writeln!(f, "    }}")
    }
}

impl fmt::Display for MeasuredSed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in self.measurements() {
            write!(f, "{m}")?;
        }
        Ok(())
    }
}

impl fmt::Display for AnalyticSed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    sed {{")?;
        writeln!(f, "      frequency {} MHz", self.reference_frequency_hz() / HZ_PER_MHZ)?;
        write_fluxes(f, self.reference_fluxes())?;
        let keyword = if self.is_logarithmic() {
            "spectral-index"
        } else {
            "polynomial"
        };
        write!(f, "      {keyword} {{")?;
        for term in self.terms() {
            write!(f, " {term}")?;
        }
        writeln!(f, " }}")?;
        writeln!(f, "    }}")
    }
}

impl fmt::Display for Sed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sed::Measured(sed) => write!(f, "{sed}"),
            Sed::Analytic(sed) => write!(f, "{sed}"),
        }
    }
}

/// Components ranked brightest first, with their Stokes I flux at `frequency_hz`.
pub fn format_brightness_table(components: &[SedComponent], frequency_hz: f64) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Stokes I at {:.3} MHz (brightest first):\n",
        frequency_hz / HZ_PER_MHZ
    ));
    out.push_str(
        format!("{:>4} {:<24} {:>12} {:<16}\n", "rank", "name", "flux [Jy]", "sed").trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<4} {:-<24} {:-<12} {:-<16}\n", "", "", "", "").trim_end());
    out.push('\n');

    for (rank, idx) in rank_components(components, frequency_hz).into_iter().enumerate() {
        let c = &components[idx];
        let flux = c
            .flux_at_frequency(frequency_hz, Polarization::I)
            .map_or_else(|| "-".to_string(), |v| format!("{v:.4}"));
        out.push_str(
            format!(
                "{:>4} {:<24} {:>12} {:<16}\n",
                rank + 1,
                truncate(c.name(), 24),
                flux,
                describe(c.sed()),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn describe(sed: Option<&Sed>) -> String {
    match sed {
        None => "none".to_string(),
        Some(Sed::Measured(sed)) => format!("measured ({})", sed.measurement_count()),
        Some(Sed::Analytic(sed)) if sed.is_logarithmic() => {
            format!("spectral-index ({})", sed.terms().len())
        }
        Some(Sed::Analytic(sed)) => format!("polynomial ({})", sed.terms().len()),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

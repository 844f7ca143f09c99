//! Numeric routines for picking peaks out of mass spectra: snapping clicks to data points, inferring charge states
//! from isotope spacing, and choosing which points deserve an on-screen label

mod annotation;
mod charge;
mod closest;
mod correlation;
mod selection;
mod spectrum;

// External Crate Imports
use miette::Diagnostic;
use rust_decimal::Decimal;
use thiserror::Error;

// Public API ==========================================================================================================

pub use annotation::{
    Annotation, annotate_range, annotate_view, bin_size, intensity_fraction, prominent_points,
};
pub use charge::{ChargeState, charge_from_spacing, charge_or_undetermined, estimate_charge};
pub use closest::closest_point;
pub use correlation::{BasePeak, Correlation, base_peak_charges, correlate};
pub use selection::{PeakNumber, PeakSelection, Session};
pub use spectrum::{ScanType, Spectrum};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, PartialEq, Debug, Diagnostic, Error)]
pub enum Error {
    #[error("cannot search for the closest point in an empty sequence")]
    EmptyInput,

    #[diagnostic(help(
        "charge states can only be read from centroided data where the target peak is followed by its next isotope"
    ))]
    #[error("the charge state of the peak at m/z {target} could not be determined: {reason}")]
    ChargeIndeterminate { target: f64, reason: String },

    #[error("spectrum has {mz} m/z values but {intensity} intensity values")]
    LengthMismatch { mz: usize, intensity: usize },

    #[diagnostic(help("spectra must be sorted by m/z, with no repeated values"))]
    #[error("m/z value {value} at index {index} is not greater than the value before it")]
    Unsorted { index: usize, value: f64 },

    #[diagnostic(help("each line should contain an m/z value and an intensity, separated by whitespace"))]
    #[error("could not read line {line} of the peak list: {text:?}")]
    PeakList { line: usize, text: String },
}

impl Error {
    pub(crate) fn charge_indeterminate(target: f64, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::ChargeIndeterminate { target, reason }
    }
}

/// Rounds to `dp` decimal places, sending exact midpoints to the even neighbour
#[must_use]
pub fn round_dp(value: f64, dp: u32) -> f64 {
    // FIXME: Going through a string is the only way I've found to land on the `f64` nearest the rounded decimal
    Decimal::from_f64_retain(value)
        .and_then(|d| d.round_dp(dp).to_string().parse().ok())
        .unwrap_or(value)
}

// Unit Tests ==========================================================================================================

// External Crate Imports
use rust_decimal::Decimal;
use serde::Serialize;

// Local Crate Imports
use crate::{GlycanComposition, SubmittedMass};

// Public API ==========================================================================================================

/// Default column names for exported tables, in the order of [`ExportRow`]'s fields
pub const EXPORT_COLUMNS: [&str; 16] = [
    "Peak",
    "Measured mass",
    "Reducing end tag",
    "Tag mass",
    "Composition (short)",
    "Composition (long)",
    "Theoretical [MH]+",
    "Delta",
    "[M+Tag+H]+",
    "[M+Tag+Na]+",
    "[M+Tag+K]+",
    "[M+Tag+NH4]+",
    "[M+Tag+2H]2+",
    "[M+Tag+H+Na]2+",
    "[M+Tag+H+K]2+",
    "[M+Tag+2Na]2+",
];

/// One composition of one submitted mass, flattened for tabular export
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct ExportRow {
    pub peak: u32,
    pub mass: f64,
    pub tag: String,
    pub tag_mass: f64,
    pub short_notation: String,
    pub long_notation: String,
    pub theoretical_mh: f64,
    pub delta: f64,
    pub mh: f64,
    pub mna: f64,
    pub mk: f64,
    pub mnh4: f64,
    pub m2h: f64,
    pub mhna: f64,
    pub mhk: f64,
    pub m2na: f64,
}

/// One composition of one submitted mass, in the shape of a stored result
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct PersistRow {
    pub peak: u32,
    pub measured: f64,
    pub theoretical_mh: f64,
    pub theoretical_mh_tag: f64,
    pub long_notation: String,
    pub short_notation: String,
    pub tag: String,
    pub tag_mass: f64,
}

impl SubmittedMass {
    #[must_use]
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.compositions
            .iter()
            .map(|composition| {
                let GlycanComposition {
                    theoretical_mh,
                    delta,
                    long_notation,
                    short_notation,
                    ions,
                } = composition;
                ExportRow {
                    peak: self.peak_number.get(),
                    mass: float(self.experimental_mass),
                    tag: self.reducing_end.name().to_owned(),
                    tag_mass: float(self.reducing_end.mass()),
                    short_notation: short_notation.clone(),
                    long_notation: long_notation.clone(),
                    theoretical_mh: float(*theoretical_mh),
                    delta: float(*delta),
                    mh: float(ions.h),
                    mna: float(ions.na),
                    mk: float(ions.k),
                    mnh4: float(ions.nh4),
                    m2h: float(ions.h2),
                    mhna: float(ions.h_na),
                    mhk: float(ions.h_k),
                    m2na: float(ions.na2),
                }
            })
            .collect()
    }

    #[must_use]
    pub fn persist_rows(&self) -> Vec<PersistRow> {
        self.compositions
            .iter()
            .map(|composition| PersistRow {
                peak: self.peak_number.get(),
                measured: float(self.experimental_mass),
                theoretical_mh: float(composition.theoretical_mh),
                theoretical_mh_tag: float(composition.ions.h),
                long_notation: composition.long_notation.clone(),
                short_notation: composition.short_notation.clone(),
                tag: self.reducing_end.name().to_owned(),
                tag_mass: float(self.reducing_end.mass()),
            })
            .collect()
    }
}

#[must_use]
pub fn export_rows(submitted: &[SubmittedMass]) -> Vec<ExportRow> {
    submitted.iter().flat_map(SubmittedMass::export_rows).collect()
}

#[must_use]
pub fn persist_rows(submitted: &[SubmittedMass]) -> Vec<PersistRow> {
    submitted.iter().flat_map(SubmittedMass::persist_rows).collect()
}

// Private Functions ===================================================================================================

// NOTE: Formatting first gives the `f64` closest to the decimal's written value
fn float(value: Decimal) -> f64 {
    value.to_string().parse().unwrap_or(f64::NAN)
}

// Unit Tests ==========================================================================================================

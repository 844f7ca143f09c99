//! Writing search results out as CSV tables and plain-text reports

mod report;

// Standard Library Imports
use std::{
    fs,
    path::{Path, PathBuf},
    string::FromUtf8Error,
};

// External Crate Imports
use chrono::{DateTime, Local};
use glycomod::{EXPORT_COLUMNS, ExportRow};
use miette::Diagnostic;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

// Public API ==========================================================================================================

pub use report::{search_banner, text_report};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Error)]
pub enum Error {
    #[diagnostic(help("exported tables have exactly {expected} columns, so exactly {expected} names are needed"))]
    #[error("{found} column names were given, but {expected} are needed")]
    ColumnCount { expected: usize, found: usize },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error("the CSV writer produced invalid UTF-8")]
    Utf8(#[from] FromUtf8Error),

    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders `rows` as CSV, naming the columns with `columns` (see [`EXPORT_COLUMNS`] for their order)
pub fn export_csv(rows: &[ExportRow], columns: &[impl AsRef<str>]) -> Result<String> {
    let names: [&str; EXPORT_COLUMNS.len()] = columns
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|_| Error::ColumnCount {
            expected: EXPORT_COLUMNS.len(),
            found: columns.len(),
        })?;

    into_csv(results_frame(rows, names)?)
}

/// The shared file name, without extension, for the outputs of a search finished at `now`
#[must_use]
pub fn output_stem(now: DateTime<Local>) -> String {
    format!("results_{}", now.format("%Y%m%d_%H%M%S"))
}

/// Writes `{stem}.csv` and `{stem}.txt` into `dir`, returning their paths
pub fn write_outputs(dir: impl AsRef<Path>, stem: &str, csv: &str, report: &str) -> Result<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    let csv_path = dir.join(format!("{stem}.csv"));
    let report_path = dir.join(format!("{stem}.txt"));

    for (path, contents) in [(&csv_path, csv), (&report_path, report)] {
        fs::write(path, contents).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        debug!("wrote {}", path.display());
    }

    Ok((csv_path, report_path))
}

// Private Functions ===================================================================================================

fn results_frame(rows: &[ExportRow], names: [&str; EXPORT_COLUMNS.len()]) -> PolarsResult<DataFrame> {
    let [
        peak,
        mass,
        tag,
        tag_mass,
        short_notation,
        long_notation,
        theoretical_mh,
        delta,
        mh,
        mna,
        mk,
        mnh4,
        m2h,
        mhna,
        mhk,
        m2na,
    ] = names;

    let integers = |name: &str, value: fn(&ExportRow) -> u32| {
        Column::new(name.into(), rows.iter().map(value).collect::<Vec<_>>())
    };
    let floats = |name: &str, value: fn(&ExportRow) -> f64| {
        Column::new(name.into(), rows.iter().map(value).collect::<Vec<_>>())
    };
    let strings = |name: &str, value: fn(&ExportRow) -> &str| {
        Column::new(name.into(), rows.iter().map(value).collect::<Vec<_>>())
    };

    DataFrame::new(vec![
        integers(peak, |r| r.peak),
        floats(mass, |r| r.mass),
        // NOTE: A free reducing end has no tag, and nulls are written as empty fields rather than `""`
        Column::new(
            tag.into(),
            rows.iter()
                .map(|r| Some(r.tag.as_str()).filter(|t| !t.is_empty()))
                .collect::<Vec<_>>(),
        ),
        floats(tag_mass, |r| r.tag_mass),
        strings(short_notation, |r| &r.short_notation),
        strings(long_notation, |r| &r.long_notation),
        floats(theoretical_mh, |r| r.theoretical_mh),
        floats(delta, |r| r.delta),
        floats(mh, |r| r.mh),
        floats(mna, |r| r.mna),
        floats(mk, |r| r.mk),
        floats(mnh4, |r| r.mnh4),
        floats(m2h, |r| r.m2h),
        floats(mhna, |r| r.mhna),
        floats(mhk, |r| r.mhk),
        floats(m2na, |r| r.m2na),
    ])
}

fn into_csv(mut df: DataFrame) -> Result<String> {
    let mut result = Vec::new();
    CsvWriter::new(&mut result).finish(&mut df)?;
    Ok(String::from_utf8(result)?)
}

// Unit Tests ==========================================================================================================

//! Glycan composition matching: building queries for a composition search service, parsing the loosely formatted
//! text it sends back, and reconciling the candidates it finds with the masses that were submitted

mod adduct;
mod client;
mod composition;
mod html;
mod masses;
mod monosaccharide;
mod params;
mod pipeline;
mod query;
mod reconcile;
mod response;
mod rows;
mod tag;

// External Crate Imports
use miette::Diagnostic;
use peaks::PeakNumber;
use thiserror::Error;

// Public API ==========================================================================================================

pub use adduct::{Adduct, AdductIons, CustomAdduct};
#[cfg(feature = "http")]
pub use client::HttpSearchService;
pub use client::{CancellationToken, SearchService, call_service};
pub use composition::{Composition, CompositionError, CompositionErrorKind};
pub use html::extract_text;
pub use masses::MassType;
pub use monosaccharide::Monosaccharide;
pub use params::{
    Linkage, MonosaccharideRule, MonosaccharideRules, NForm, OForm, Presence, ResidueMode, SearchParameters,
    ToleranceUnit,
};
pub use pipeline::{Persistence, Pipeline, RunReport, RunStore, SearchRun};
pub use query::{FormValue, QueryForm, SingleChargedMass, build_query, normalize_masses};
pub use reconcile::{GlycanComposition, Reconciler, Reconciliation, ReconciliationMismatch, SubmittedMass};
pub use response::{
    LineKind, ParsedResponse, StructureLine, StructureLineError, classify, parse_response, parse_structure_line,
};
pub use rows::{EXPORT_COLUMNS, ExportRow, PersistRow, export_rows, persist_rows};
pub use tag::{CustomTag, ReducingEnd};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, PartialEq, Debug, Diagnostic, Error)]
pub enum Error {
    #[error("no masses were selected for searching")]
    EmptyInput,

    #[error("invalid value for {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[diagnostic(help("supported adducts are: H+, Na+, K+, Pos_other, H-, M, Ac, TFA and Neg_other"))]
    #[error("the adduct {adduct:?} is not supported")]
    UnsupportedAdduct { adduct: String },

    #[diagnostic(help("supported tags are 2-AB and ProA, or give a custom name and mass"))]
    #[error("the reducing-end tag {tag:?} is not supported")]
    UnsupportedTag { tag: String },

    #[diagnostic(help("pick the peak again, or give its charge explicitly"))]
    #[error("peak {peak_number} at m/z {mass} has an undetermined charge state")]
    UndeterminedCharge { peak_number: PeakNumber, mass: f64 },

    #[error("peak {peak_number} has a mass that is not a finite number: {mass}")]
    InvalidMass { peak_number: PeakNumber, mass: f64 },

    #[diagnostic(transparent)]
    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[diagnostic(help(
        "results are matched to masses by position, so a response with a different number of blocks can't be trusted"
    ))]
    #[error("{expected} masses were submitted, but the response contained {found} result blocks")]
    BlockCountMismatch { expected: usize, found: usize },

    #[error("the search service request failed: {0}")]
    Network(String),

    #[error("the search service did not respond within {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("the search was cancelled")]
    Cancelled,
}

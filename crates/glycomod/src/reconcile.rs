// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// External Crate Imports
use peaks::PeakNumber;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, error};

// Local Crate Imports
use crate::{
    Adduct, AdductIons, LineKind, MassType, ParsedResponse, ReducingEnd, Result, SingleChargedMass, StructureLine,
    StructureLineError, classify, parse_structure_line,
};

// Constants ===========================================================================================================

const NOT_FOUND: &str = "NOT FOUND";
// NOTE: Far outside any search tolerance, so these never pass for a real match
const NOT_FOUND_DELTA: Decimal = dec!(1000.0);

// Public API ==========================================================================================================

/// A candidate composition for a submitted mass
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct GlycanComposition {
    pub theoretical_mh: Decimal,
    pub delta: Decimal,
    pub long_notation: String,
    pub short_notation: String,
    pub ions: AdductIons,
}

impl GlycanComposition {
    /// Stands in for the compositions of a mass the service couldn't match
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            theoretical_mh: Decimal::ZERO,
            delta: NOT_FOUND_DELTA,
            long_notation: NOT_FOUND.to_owned(),
            short_notation: NOT_FOUND.to_owned(),
            ions: AdductIons::default(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.long_notation == NOT_FOUND
    }

    fn from_structure(structure: StructureLine, mass_type: MassType, reducing_end: &ReducingEnd) -> Self {
        let ions = AdductIons::new(&structure.composition, mass_type, reducing_end);
        Self {
            theoretical_mh: structure.theoretical_mh,
            delta: structure.delta,
            long_notation: structure.notation,
            short_notation: structure.composition.short_notation(),
            ions,
        }
    }
}

impl Display for GlycanComposition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Theoretical [MH]+: {}, Delta: {}, Comp: {}",
            self.theoretical_mh, self.delta, self.short_notation
        )
    }
}

/// Everything found for one submitted mass
#[derive(Clone, PartialEq, Debug)]
pub struct SubmittedMass {
    pub peak_number: PeakNumber,
    pub experimental_mass: Decimal,
    pub adduct: Adduct,
    pub adduct_mass: Decimal,
    pub reducing_end: ReducingEnd,
    pub compositions: Vec<GlycanComposition>,
}

impl Display for SubmittedMass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Experimental mass: {}", self.experimental_mass)?;
        writeln!(f, "Adduct: {} ({})", self.adduct, self.adduct_mass)?;
        writeln!(
            f,
            "Reducing end: {} ({})",
            self.reducing_end,
            self.reducing_end.mass()
        )?;
        write!(f, "Compositions: {}", self.compositions.len())
    }
}

/// A response block whose reported mass differs from the mass submitted in its position
#[derive(Clone, PartialEq, Debug)]
pub struct ReconciliationMismatch {
    pub block: usize,
    pub expected: SingleChargedMass,
    pub reported: String,
}

impl Display for ReconciliationMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block {} reports a user mass of {:?}, but {} was submitted for peak {}",
            self.block + 1,
            self.reported,
            self.expected.mz,
            self.expected.peak_number
        )
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Reconciliation {
    /// One entry per submitted mass, in submission order
    pub submitted: Vec<SubmittedMass>,
    pub mismatches: Vec<ReconciliationMismatch>,
    pub structure_errors: Vec<StructureLineError>,
}

impl Reconciliation {
    /// The number of compositions found, counting "not found" placeholders
    #[must_use]
    pub fn composition_count(&self) -> usize {
        self.submitted.iter().map(|s| s.compositions.len()).sum()
    }
}

/// Turns response blocks into compositions, using the search settings to compute their ion masses
#[derive(Clone, PartialEq, Debug)]
pub struct Reconciler {
    mass_type: MassType,
    adduct: Adduct,
    reducing_end: ReducingEnd,
}

impl Reconciler {
    #[must_use]
    pub const fn new(mass_type: MassType, adduct: Adduct, reducing_end: ReducingEnd) -> Self {
        Self {
            mass_type,
            adduct,
            reducing_end,
        }
    }

    /// Pairs each block of `response` with the mass at the same position in `masses`. A block whose reported mass
    /// doesn't match, or that reports no mass at all, is kept, but loses its peak number.
    pub fn reconcile(&self, masses: &[SingleChargedMass], response: &ParsedResponse) -> Result<Reconciliation> {
        response.ensure_block_count(masses.len())?;

        let mut reconciliation = Reconciliation::default();
        for (block, (&expected, lines)) in masses.iter().zip(response.blocks()).enumerate() {
            let mut peak_number = expected.peak_number;
            let mut experimental_mass = expected.mz;
            let mut compositions = Vec::new();
            let mut reported_mass = false;

            for line in lines {
                match classify(line) {
                    LineKind::UserMass(reported) => {
                        reported_mass = true;
                        let parsed: Option<Decimal> = reported.parse().ok();
                        if let Some(mass) = parsed {
                            experimental_mass = mass;
                        }
                        if parsed != Some(expected.mz) {
                            let mismatch = ReconciliationMismatch {
                                block,
                                expected,
                                reported,
                            };
                            error!("{mismatch}; the results will be stored under peak {}", PeakNumber::UNMATCHED);
                            peak_number = PeakNumber::UNMATCHED;
                            reconciliation.mismatches.push(mismatch);
                        }
                    }
                    LineKind::NoStructures => compositions.push(GlycanComposition::not_found()),
                    LineKind::Structure(line) => match parse_structure_line(line) {
                        Ok(structure) => compositions.push(GlycanComposition::from_structure(
                            structure,
                            self.mass_type,
                            &self.reducing_end,
                        )),
                        Err(err) => {
                            error!("skipping a structure for peak {peak_number}: {err}");
                            reconciliation.structure_errors.push(err);
                        }
                    },
                    LineKind::StructureCount | LineKind::Other => (),
                }
            }

            if !reported_mass {
                let mismatch = ReconciliationMismatch {
                    block,
                    expected,
                    reported: String::new(),
                };
                error!("{mismatch}; the results will be stored under peak {}", PeakNumber::UNMATCHED);
                peak_number = PeakNumber::UNMATCHED;
                reconciliation.mismatches.push(mismatch);
            }

            debug!(
                "found {} composition(s) for {experimental_mass} (peak {peak_number})",
                compositions.len()
            );
            reconciliation.submitted.push(SubmittedMass {
                peak_number,
                experimental_mass,
                adduct: self.adduct.clone(),
                adduct_mass: self.adduct.mass(self.mass_type),
                reducing_end: self.reducing_end.clone(),
                compositions,
            });
        }

        Ok(reconciliation)
    }
}

// Unit Tests ==========================================================================================================

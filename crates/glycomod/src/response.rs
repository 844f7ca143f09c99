// Standard Library Imports
use std::str::FromStr;

// External Crate Imports
use miette::Diagnostic;
use rust_decimal::Decimal;
use thiserror::Error;

// Local Crate Imports
use crate::{Composition, CompositionError, Result};

// Constants ===========================================================================================================

// NOTE: Removed in this order, so longer phrases must come before any of their fragments
const BOILERPLATE: [&str; 10] = [
    "\nglycoform mass\nΔmass (Dalton)\nstructure\ntype\nLinks",
    "high_manUniCarbKB",
    "hybrid/complexUniCarbKB",
    " -UniCarbKB",
    "high_man",
    "hybrid/complex",
    "paucimannose",
    " -",
    "\n\n\n\nSIB Swiss Institute of Bioinformatics | Disclaimer",
    "Back to the Top\n\n",
];

const BLOCK_DELIMITER: &str = " found.";
const BLOCK_MARKER: &str = "found.";
const USER_MASS: &str = "User mass: ";
const NO_STRUCTURES: &str = "0 structure";
const STRUCTURE_COUNT: &str = "structure";

// Public API ==========================================================================================================

/// The non-empty lines of a search response, grouped into one block per submitted mass
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ParsedResponse {
    blocks: Vec<Vec<String>>,
}

impl ParsedResponse {
    #[must_use]
    pub fn blocks(&self) -> &[Vec<String>] {
        &self.blocks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks are matched to masses by position alone, so any difference in their counts means nothing lines up
    pub fn ensure_block_count(&self, expected: usize) -> Result<()> {
        let found = self.len();
        if found == expected {
            Ok(())
        } else {
            Err(crate::Error::BlockCountMismatch { expected, found })
        }
    }
}

/// Splits the text of a search response into per-mass blocks. Every block but the last loses its closing
/// `" found."`, and a response without any such marker has no blocks at all.
#[must_use]
pub fn parse_response(text: &str) -> ParsedResponse {
    let text = BOILERPLATE
        .iter()
        .fold(text.to_owned(), |text, boilerplate| text.replace(boilerplate, ""));

    let block_count = text.matches(BLOCK_MARKER).count();
    let blocks = text
        .splitn(block_count, BLOCK_DELIMITER)
        .map(|block| {
            block
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .collect();

    ParsedResponse { blocks }
}

/// What a single line of a response block reports
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum LineKind<'a> {
    /// The mass the service says it searched for, with all whitespace removed
    UserMass(String),
    /// The service found no compositions for this mass
    NoStructures,
    /// A summary like `2 structures`
    StructureCount,
    /// A candidate composition
    Structure(&'a str),
    Other,
}

#[must_use]
pub fn classify(line: &str) -> LineKind<'_> {
    if let Some(mass) = line.strip_prefix(USER_MASS) {
        return LineKind::UserMass(mass.split_whitespace().collect());
    }
    if !line.starts_with(|c: char| c.is_ascii_digit()) {
        return LineKind::Other;
    }

    if line.starts_with(NO_STRUCTURES) {
        LineKind::NoStructures
    } else if line.contains(STRUCTURE_COUNT) {
        LineKind::StructureCount
    } else {
        LineKind::Structure(line)
    }
}

/// A candidate composition, as reported by the search service
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct StructureLine {
    pub theoretical_mh: Decimal,
    pub delta: Decimal,
    pub composition: Composition,
    /// The composition exactly as the service wrote it
    pub notation: String,
}

#[derive(Clone, PartialEq, Debug, Diagnostic, Error)]
pub enum StructureLineError {
    #[error("the structure line {line:?} contains no composition")]
    MissingComposition { line: String },

    #[diagnostic(help("the mass and delta should be written back-to-back, like 1434.5020.48 or 892.317-0.034"))]
    #[error("couldn't find where the mass ends and the delta begins in {numbers:?}")]
    MissingDelta { line: String, numbers: String },

    #[error("{text:?} in the structure line {line:?} is not a number")]
    InvalidNumber { line: String, text: String },

    #[error("the structure line {line:?} contains an invalid composition")]
    Composition {
        line: String,
        #[source]
        #[diagnostic_source]
        source: CompositionError,
    },
}

/// Reads a line like `892.317-0.034(Hex)3 (HexNAc)2`, where the theoretical mass, the delta, and the composition are
/// written without separators between them.
pub fn parse_structure_line(line: &str) -> Result<StructureLine, StructureLineError> {
    let line = line.trim();
    let owned_line = || line.to_owned();

    let split = line
        .find('(')
        .ok_or_else(|| StructureLineError::MissingComposition { line: owned_line() })?;
    let (numbers, notation) = line.split_at(split);

    let (mass, delta) = split_numbers(numbers.trim()).ok_or_else(|| StructureLineError::MissingDelta {
        line: owned_line(),
        numbers: numbers.to_owned(),
    })?;
    let number = |text: &str| {
        Decimal::from_str(text).map_err(|_| StructureLineError::InvalidNumber {
            line: owned_line(),
            text: text.to_owned(),
        })
    };
    let theoretical_mh = number(mass)?;
    let delta = number(delta)?;

    let notation = notation.trim();
    let composition = notation
        .parse()
        .map_err(|source| StructureLineError::Composition {
            line: owned_line(),
            source,
        })?;

    Ok(StructureLine {
        theoretical_mh,
        delta,
        composition,
        notation: notation.to_owned(),
    })
}

// Private Functions ===================================================================================================

// NOTE: A negative delta starts at its sign. A positive delta always has a single digit before its decimal point, so
// it starts one character before the last decimal point.
fn split_numbers(numbers: &str) -> Option<(&str, &str)> {
    let split = match numbers.find('-') {
        Some(sign) if sign > 0 => sign,
        _ => numbers.rfind('.').filter(|&point| point > 1)? - 1,
    };
    let (mass, delta) = numbers.split_at(split);
    (!mass.is_empty() && !delta.is_empty()).then_some((mass, delta))
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rust_decimal_macros::dec;

    use super::*;

    const TWO_BLOCKS: &str = indoc! {"

        User mass: 911.30
        Adduct ([M+H]+): 1.00727
        Derivative mass (Free reducing end): 18.0105546
        glycoform mass
        Δmass (Dalton)
        structure
        type
        Links
        892.317-0.034(Hex)3 (HexNAc)2  paucimannose
        1 structure found.

        User mass: 1057.33
        Adduct ([M+H]+): 1.00727
        Derivative mass (Free reducing end): 18.0105546
        1038.375-0.062(Hex)3 (HexNAc)2 (Deoxyhexose)1 -UniCarbKB
        1 structure found.
    "};

    #[test]
    fn split_into_blocks() {
        let response = parse_response(TWO_BLOCKS);
        assert_eq!(
            response.blocks(),
            [
                vec![
                    "User mass: 911.30",
                    "Adduct ([M+H]+): 1.00727",
                    "Derivative mass (Free reducing end): 18.0105546",
                    "892.317-0.034(Hex)3 (HexNAc)2",
                    "1 structure",
                ],
                vec![
                    "User mass: 1057.33",
                    "Adduct ([M+H]+): 1.00727",
                    "Derivative mass (Free reducing end): 18.0105546",
                    "1038.375-0.062(Hex)3 (HexNAc)2 (Deoxyhexose)1",
                    "1 structure found.",
                ],
            ]
        );
        assert_eq!(response.ensure_block_count(2), Ok(()));
        assert_eq!(
            response.ensure_block_count(3),
            Err(crate::Error::BlockCountMismatch {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn responses_without_markers() {
        let response = parse_response("Internal Server Error");
        assert!(response.is_empty());
        assert_eq!(parse_response(""), ParsedResponse::default());
    }

    #[test]
    fn classify_lines() {
        assert_eq!(
            classify("User mass: 911. 30"),
            LineKind::UserMass("911.30".to_owned())
        );
        assert_eq!(classify("Adduct ([M+H]+): 1.00727"), LineKind::Other);
        assert_eq!(classify("0 structures found."), LineKind::NoStructures);
        assert_eq!(classify("0 structure"), LineKind::NoStructures);
        assert_eq!(classify("10 structures"), LineKind::StructureCount);
        assert_eq!(classify("1 structure found."), LineKind::StructureCount);
        assert_eq!(
            classify("892.317-0.034(Hex)3 (HexNAc)2"),
            LineKind::Structure("892.317-0.034(Hex)3 (HexNAc)2")
        );
    }

    #[test]
    fn structure_with_negative_delta() {
        let line = parse_structure_line("892.317-0.034(Hex)3 (HexNAc)2  ").unwrap();
        assert_eq!(line.theoretical_mh, dec!(892.317));
        assert_eq!(line.delta, dec!(-0.034));
        assert_eq!(line.notation, "(Hex)3 (HexNAc)2");
        assert_eq!(line.composition.short_notation(), "H3N2");
    }

    #[test]
    fn structure_with_positive_delta() {
        let line = parse_structure_line("1434.5020.48(Hex)3 (HexNAc)2 (Deoxyhexose)1 (Pent)3").unwrap();
        assert_eq!(line.theoretical_mh, dec!(1434.502));
        assert_eq!(line.delta, dec!(0.48));
        assert_eq!(line.composition.short_notation(), "H3N2F1P3");

        let line = parse_structure_line("1397.5080.114(HexNAc)4 (Deoxyhexose)1 (NeuGc)1 (Pent)1").unwrap();
        assert_eq!(line.theoretical_mh, dec!(1397.508));
        assert_eq!(line.delta, dec!(0.114));
    }

    #[test]
    fn malformed_structures() {
        assert!(matches!(
            parse_structure_line("892.317-0.034"),
            Err(StructureLineError::MissingComposition { .. })
        ));
        assert!(matches!(
            parse_structure_line("892(Hex)3"),
            Err(StructureLineError::MissingDelta { .. })
        ));
        assert!(matches!(
            parse_structure_line("892.31x-0.034(Hex)3"),
            Err(StructureLineError::InvalidNumber { text, .. }) if text == "892.31x"
        ));
        assert!(matches!(
            parse_structure_line("892.317-0.034(Fuc)1"),
            Err(StructureLineError::Composition { .. })
        ));
    }
}

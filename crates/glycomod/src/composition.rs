// Standard Library Imports
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

// External Crate Imports
use itertools::Itertools;
use miette::{Diagnostic, LabeledSpan, SourceSpan};
use nom::{
    IResult, Parser,
    character::complete::{alphanumeric1, char, space0, u32},
    combinator::{all_consuming, cut},
    error::{ErrorKind, ParseError},
    multi::fold_many1,
    sequence::{pair, preceded, terminated},
};
use rust_decimal::Decimal;
use thiserror::Error;

// Local Crate Imports
use crate::{MassType, Monosaccharide};

// Public API ==========================================================================================================

/// How many of each monosaccharide a glycan contains
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Composition {
    counts: [u32; Monosaccharide::ALL.len()],
}

impl Composition {
    #[must_use]
    pub const fn count(&self, monosaccharide: Monosaccharide) -> u32 {
        self.counts[monosaccharide.index()]
    }

    pub fn add(&mut self, monosaccharide: Monosaccharide, count: u32) {
        self.counts[monosaccharide.index()] += count;
    }

    /// The monosaccharides present, in report order
    pub fn residues(&self) -> impl Iterator<Item = (Monosaccharide, u32)> + '_ {
        Monosaccharide::ALL
            .into_iter()
            .map(|m| (m, self.count(m)))
            .filter(|&(_, count)| count > 0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.residues().next().is_none()
    }

    /// Like `(Hex)3 (HexNAc)2`
    #[must_use]
    pub fn long_notation(&self) -> String {
        self.residues()
            .map(|(m, count)| format!("({m}){count}"))
            .join(" ")
    }

    /// Like `H3N2`
    #[must_use]
    pub fn short_notation(&self) -> String {
        self.residues()
            .map(|(m, count)| format!("{}{count}", m.symbol()))
            .join("")
    }

    /// The summed residue masses, without the water lost when they were linked
    #[must_use]
    pub fn residue_mass(&self, mass_type: MassType) -> Decimal {
        self.residues()
            .map(|(m, count)| m.residue_mass(mass_type) * Decimal::from(count))
            .sum()
    }

    /// The mass of the free glycan: its residues plus one water
    #[must_use]
    pub fn neutral_mass(&self, mass_type: MassType) -> Decimal {
        self.residue_mass(mass_type) + mass_type.water()
    }
}

impl FromIterator<(Monosaccharide, u32)> for Composition {
    fn from_iter<T: IntoIterator<Item = (Monosaccharide, u32)>>(iter: T) -> Self {
        let mut composition = Self::default();
        for (monosaccharide, count) in iter {
            composition.add(monosaccharide, count);
        }
        composition
    }
}

impl Display for Composition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.long_notation())
    }
}

impl FromStr for Composition {
    type Err = CompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = all_consuming(terminated(composition, space0));
        parser
            .parse(s)
            .map(|(_, composition)| composition)
            .map_err(|e| match e {
                nom::Err::Error(failure) | nom::Err::Failure(failure) => failure.into_error(s),
                nom::Err::Incomplete(_) => CompositionError::new(s, s.len(), 0, CompositionErrorKind::Incomplete),
            })
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("{kind}")]
pub struct CompositionError {
    source_code: String,
    span: SourceSpan,
    kind: CompositionErrorKind,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
pub enum CompositionErrorKind {
    #[error("expected a composition like (Hex)3 (HexNAc)2")]
    ExpectedComposition,

    #[error("expected '(' to open a monosaccharide name")]
    ExpectedOpeningParen,

    #[error("expected a monosaccharide name")]
    ExpectedName,

    #[error("unknown monosaccharide")]
    UnknownMonosaccharide,

    #[error("expected ')' to close the monosaccharide name")]
    ExpectedClosingParen,

    #[error("expected a count after the monosaccharide name")]
    ExpectedCount,

    #[error("could not interpret the full input as a composition")]
    Incomplete,

    #[error("internal `nom` error: {0:?}")]
    Nom(ErrorKind),
}

impl CompositionError {
    fn new(input: &str, offset: usize, length: usize, kind: CompositionErrorKind) -> Self {
        // NOTE: The extra space lets labels point at the end of the input
        let source_code = format!("{input} ");
        let span = SourceSpan::from(offset..offset + length);
        Self {
            source_code,
            span,
            kind,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> CompositionErrorKind {
        self.kind
    }

    #[must_use]
    pub fn input(&self) -> &str {
        self.source_code.trim_end()
    }
}

impl Diagnostic for CompositionError {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source_code)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        let help = match self.kind {
            CompositionErrorKind::UnknownMonosaccharide => format!(
                "the known monosaccharides are {}",
                Monosaccharide::ALL.iter().join(", ")
            ),
            CompositionErrorKind::Incomplete => {
                "check the unparsed region for errors, or remove it from the composition".to_owned()
            }
            CompositionErrorKind::Nom(_) => {
                "this is an internal error that you shouldn't ever see! Please report it as a bug!".to_owned()
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = match self.kind {
            CompositionErrorKind::ExpectedComposition | CompositionErrorKind::ExpectedOpeningParen => "expected '('",
            CompositionErrorKind::ExpectedName => "expected a name",
            CompositionErrorKind::UnknownMonosaccharide => "not a known monosaccharide",
            CompositionErrorKind::ExpectedClosingParen => "expected ')'",
            CompositionErrorKind::ExpectedCount => "expected a count",
            CompositionErrorKind::Incomplete => "input was valid up until this point",
            CompositionErrorKind::Nom(_) => "the region that triggered this bug!",
        };
        let label = LabeledSpan::new_with_span(Some(label.to_owned()), self.span);
        Some(Box::new(std::iter::once(label)))
    }
}

// Private Types =======================================================================================================

#[derive(Clone, Eq, PartialEq, Debug)]
struct ParseFailure<'a> {
    input: &'a str,
    length: usize,
    kind: CompositionErrorKind,
}

impl ParseFailure<'_> {
    fn into_error(self, full_input: &str) -> CompositionError {
        let offset = full_input.len() - self.input.len();
        CompositionError::new(full_input, offset, self.length, self.kind)
    }
}

impl<'a> ParseError<&'a str> for ParseFailure<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        let kind = match kind {
            ErrorKind::Eof => CompositionErrorKind::Incomplete,
            kind => CompositionErrorKind::Nom(kind),
        };
        Self {
            input,
            length: 0,
            kind,
        }
    }

    fn append(_: &'a str, _: ErrorKind, other: Self) -> Self {
        other
    }
}

type ParseResult<'a, O> = IResult<&'a str, O, ParseFailure<'a>>;

// Private Parsers =====================================================================================================

/// Composition = { [ space ] , Residue Count }- ;
fn composition(i: &str) -> ParseResult<Composition> {
    let residue_count = preceded(space0, residue_count);
    let parser = fold_many1(residue_count, Composition::default, |mut composition, (m, count)| {
        composition.add(m, count);
        composition
    });
    expect(parser, CompositionErrorKind::ExpectedComposition)(i)
}

/// Residue Count = "(" , Name , ")" , Count ;
fn residue_count(i: &str) -> ParseResult<(Monosaccharide, u32)> {
    let opening_paren = expect(char('('), CompositionErrorKind::ExpectedOpeningParen);
    let closing_paren = expect(char(')'), CompositionErrorKind::ExpectedClosingParen);
    let count = expect(u32, CompositionErrorKind::ExpectedCount);
    preceded(
        opening_paren,
        cut(pair(terminated(monosaccharide, closing_paren), count)),
    )(i)
}

/// Name = { letter | digit }- ;
fn monosaccharide(i: &str) -> ParseResult<Monosaccharide> {
    let (rest, name) = expect(alphanumeric1, CompositionErrorKind::ExpectedName)(i)?;
    Monosaccharide::from_name(name).map_or_else(
        || {
            Err(nom::Err::Failure(ParseFailure {
                input: i,
                length: name.len(),
                kind: CompositionErrorKind::UnknownMonosaccharide,
            }))
        },
        |m| Ok((rest, m)),
    )
}

// NOTE: Only recoverable errors are relabelled, so the innermost `Failure` keeps its more specific kind
fn expect<'a, O>(
    mut parser: impl Parser<&'a str, O, ParseFailure<'a>>,
    kind: CompositionErrorKind,
) -> impl FnMut(&'a str) -> ParseResult<'a, O> {
    move |i| {
        parser.parse(i).map_err(|e| match e {
            nom::Err::Error(failure) => nom::Err::Error(ParseFailure { kind, ..failure }),
            e => e,
        })
    }
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_compositions() {
        let core: Composition = "(Hex)3 (HexNAc)2".parse().unwrap();
        assert_eq!(core.count(Monosaccharide::Hex), 3);
        assert_eq!(core.count(Monosaccharide::HexNAc), 2);
        assert_eq!(core.count(Monosaccharide::Deoxyhexose), 0);

        // Whitespace is optional between residues and allowed at the end
        let fucosylated: Composition = "(Hex)3(HexNAc)2 (Deoxyhexose)1  ".parse().unwrap();
        assert_eq!(fucosylated.short_notation(), "H3N2F1");

        // Repeated residues are summed
        let repeated: Composition = "(Hex)1 (HexNAc)2 (Hex)2".parse().unwrap();
        assert_eq!(repeated.count(Monosaccharide::Hex), 3);

        let everything: Composition =
            "(Hex)1 (HexNAc)1 (Deoxyhexose)1 (NeuAc)1 (NeuGc)1 (Pent)1 (Sulph)1 (Phos)1 (KDN)1 (HexA)1"
                .parse()
                .unwrap();
        assert_eq!(everything.short_notation(), "H1N1F1S1G1P1Su1Ph1K1U1");
    }

    #[test]
    fn invalid_compositions() {
        let kind = |s: &str| s.parse::<Composition>().map_err(|e| e.kind());
        assert_eq!(kind(""), Err(CompositionErrorKind::ExpectedComposition));
        assert_eq!(kind("Hex3"), Err(CompositionErrorKind::ExpectedComposition));
        assert_eq!(kind("(Fuc)1"), Err(CompositionErrorKind::UnknownMonosaccharide));
        assert_eq!(kind("(Hex 3"), Err(CompositionErrorKind::ExpectedClosingParen));
        assert_eq!(kind("(Hex)"), Err(CompositionErrorKind::ExpectedCount));
        assert_eq!(kind("(Hex)3 (HexNAc)x"), Err(CompositionErrorKind::ExpectedCount));
        assert_eq!(kind("()3"), Err(CompositionErrorKind::ExpectedName));
        assert_eq!(kind("(Hex)3 junk"), Err(CompositionErrorKind::Incomplete));
    }

    #[test]
    fn error_spans() {
        let error = "(Hex)3 (Fuc)1".parse::<Composition>().unwrap_err();
        assert_eq!(error.span, SourceSpan::from(8..11));
        assert_eq!(error.input(), "(Hex)3 (Fuc)1");
        assert_eq!(error.to_string(), "unknown monosaccharide");
        let labels: Vec<_> = error.labels().unwrap().collect();
        assert_eq!(labels[0].label(), Some("not a known monosaccharide"));
        assert!(error.help().is_some());

        let error = "(Hex)3 junk".parse::<Composition>().unwrap_err();
        assert_eq!(error.span, SourceSpan::from(7..7));
    }

    #[test]
    fn notations() {
        let composition: Composition = [
            (Monosaccharide::NeuAc, 2),
            (Monosaccharide::Hex, 5),
            (Monosaccharide::HexNAc, 4),
        ]
        .into_iter()
        .collect();
        assert_eq!(composition.long_notation(), "(Hex)5 (HexNAc)4 (NeuAc)2");
        assert_eq!(composition.to_string(), "(Hex)5 (HexNAc)4 (NeuAc)2");
        assert_eq!(composition.short_notation(), "H5N4S2");
        assert!(!composition.is_empty());
        assert!(Composition::default().is_empty());
        assert_eq!(Composition::default().short_notation(), "");
    }

    #[test]
    fn masses() {
        let core: Composition = "(Hex)3 (HexNAc)2".parse().unwrap();
        assert_eq!(core.residue_mass(MassType::Monoisotopic), dec!(892.317218));
        assert_eq!(core.neutral_mass(MassType::Monoisotopic), dec!(910.327783));
        assert_eq!(core.neutral_mass(MassType::Average), dec!(910.8325));
    }
}

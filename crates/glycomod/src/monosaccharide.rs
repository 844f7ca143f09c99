// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// External Crate Imports
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// Local Crate Imports
use crate::MassType;

// Public API ==========================================================================================================

/// The residues the composition search knows how to count, in the order it reports them
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Monosaccharide {
    Hex,
    HexNAc,
    Deoxyhexose,
    NeuAc,
    NeuGc,
    Pent,
    Sulph,
    Phos,
    Kdn,
    HexA,
}

impl Monosaccharide {
    pub const ALL: [Self; 10] = [
        Self::Hex,
        Self::HexNAc,
        Self::Deoxyhexose,
        Self::NeuAc,
        Self::NeuGc,
        Self::Pent,
        Self::Sulph,
        Self::Phos,
        Self::Kdn,
        Self::HexA,
    ];

    /// The name used in long notation and in the search form's field names
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hex => "Hex",
            Self::HexNAc => "HexNAc",
            Self::Deoxyhexose => "Deoxyhexose",
            Self::NeuAc => "NeuAc",
            Self::NeuGc => "NeuGc",
            Self::Pent => "Pent",
            Self::Sulph => "Sulph",
            Self::Phos => "Phos",
            Self::Kdn => "KDN",
            Self::HexA => "HexA",
        }
    }

    /// The abbreviation used in short notation, like the `F` in `H5N4F1`
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Hex => "H",
            Self::HexNAc => "N",
            Self::Deoxyhexose => "F",
            Self::NeuAc => "S",
            Self::NeuGc => "G",
            Self::Pent => "P",
            Self::Sulph => "Su",
            Self::Phos => "Ph",
            Self::Kdn => "K",
            Self::HexA => "U",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    #[must_use]
    pub const fn residue_mass(self, mass_type: MassType) -> Decimal {
        let masses = match self {
            Self::Hex => (dec!(162.052824), dec!(162.1424)),
            Self::HexNAc => (dec!(203.079373), dec!(203.1950)),
            Self::Deoxyhexose => (dec!(146.057909), dec!(146.1430)),
            Self::NeuAc => (dec!(291.095417), dec!(291.2579)),
            Self::NeuGc => (dec!(307.090331), dec!(307.2573)),
            Self::Pent => (dec!(132.042259), dec!(132.1161)),
            Self::Sulph => (dec!(79.956815), dec!(80.0642)),
            Self::Phos => (dec!(79.966331), dec!(79.9799)),
            Self::Kdn => (dec!(250.068867), dec!(250.2053)),
            Self::HexA => (dec!(176.032088), dec!(176.1259)),
        };
        mass_type.pick(masses)
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl Display for Monosaccharide {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// Unit Tests ==========================================================================================================

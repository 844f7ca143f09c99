// Standard Library Imports
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

// External Crate Imports
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// Local Crate Imports
use crate::{Error, MassType};

// Constants ===========================================================================================================

const TWO_AB: Decimal = dec!(120.0688);
const PROA: Decimal = dec!(219.1736);

const FULL_MASS_DECIMAL_PLACES: u32 = 4;

// Public API ==========================================================================================================

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CustomTag {
    pub name: String,
    pub mass: Decimal,
}

/// A label attached to the reducing end of a glycan
#[derive(Clone, PartialEq, Debug, Default)]
pub enum ReducingEnd {
    #[default]
    Free,
    TwoAb,
    ProA,
    Custom(CustomTag),
}

impl ReducingEnd {
    /// The tag's name as stored alongside results; empty for a free reducing end
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Free => "",
            Self::TwoAb => "2-AB",
            Self::ProA => "ProA",
            Self::Custom(CustomTag { name, .. }) => name,
        }
    }

    /// The mass the tag adds to a glycan
    #[must_use]
    pub fn mass(&self) -> Decimal {
        match self {
            Self::Free => Decimal::ZERO,
            Self::TwoAb => TWO_AB,
            Self::ProA => PROA,
            Self::Custom(CustomTag { mass, .. }) => *mass,
        }
    }

    /// The tag mass plus the water of the reducing end, as the search service expects a derivative mass
    #[must_use]
    pub fn full_mass(&self) -> Decimal {
        (self.mass() + MassType::Monoisotopic.water()).round_dp(FULL_MASS_DECIMAL_PLACES)
    }

    #[must_use]
    pub const fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }
}

impl FromStr for ReducingEnd {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "free" | "Free" => Ok(Self::Free),
            "2-AB" | "2AB" => Ok(Self::TwoAb),
            "ProA" | "PA" => Ok(Self::ProA),
            tag => Err(Error::UnsupportedTag {
                tag: tag.to_owned(),
            }),
        }
    }
}

impl Display for ReducingEnd {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "Free reducing end"),
            tag => write!(f, "{}", tag.name()),
        }
    }
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tags() {
        assert_eq!("2-AB".parse(), Ok(ReducingEnd::TwoAb));
        assert_eq!("ProA".parse(), Ok(ReducingEnd::ProA));
        assert_eq!("".parse(), Ok(ReducingEnd::Free));
        assert_eq!(
            "2-AA".parse::<ReducingEnd>(),
            Err(Error::UnsupportedTag {
                tag: "2-AA".to_owned()
            })
        );
    }

    #[test]
    fn tag_masses() {
        assert_eq!(ReducingEnd::Free.mass(), Decimal::ZERO);
        assert_eq!(ReducingEnd::Free.full_mass(), dec!(18.0106));
        assert_eq!(ReducingEnd::TwoAb.full_mass(), dec!(138.0794));
        assert_eq!(ReducingEnd::ProA.full_mass(), dec!(237.1842));

        let custom = ReducingEnd::Custom(CustomTag {
            name: "RFMS".to_owned(),
            mass: dec!(311.1532),
        });
        assert_eq!(custom.name(), "RFMS");
        assert_eq!(custom.full_mass(), dec!(329.1638));
        assert!(!custom.is_free());
        assert_eq!(ReducingEnd::Free.to_string(), "Free reducing end");
        assert_eq!(ReducingEnd::Free.name(), "");
    }
}

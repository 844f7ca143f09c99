// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// External Crate Imports
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// Public API ==========================================================================================================

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MassType {
    #[default]
    Monoisotopic,
    Average,
}

impl MassType {
    #[must_use]
    pub const fn form_value(self) -> &'static str {
        match self {
            Self::Monoisotopic => "monoisotopic",
            Self::Average => "average",
        }
    }

    #[must_use]
    pub const fn water(self) -> Decimal {
        self.pick(WATER)
    }

    #[must_use]
    pub const fn proton(self) -> Decimal {
        self.pick(PROTON)
    }

    #[must_use]
    pub const fn sodium(self) -> Decimal {
        self.pick(SODIUM)
    }

    #[must_use]
    pub const fn potassium(self) -> Decimal {
        self.pick(POTASSIUM)
    }

    #[must_use]
    pub const fn ammonium(self) -> Decimal {
        self.pick(AMMONIUM)
    }

    pub(crate) const fn pick(self, (monoisotopic, average): (Decimal, Decimal)) -> Decimal {
        match self {
            Self::Monoisotopic => monoisotopic,
            Self::Average => average,
        }
    }
}

impl Display for MassType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.form_value())
    }
}

// Constants ===========================================================================================================

// NOTE: All pairs are (monoisotopic, average). Ion masses have the electron mass removed.
const WATER: (Decimal, Decimal) = (dec!(18.010565), dec!(18.0153));
const PROTON: (Decimal, Decimal) = (dec!(1.007276), dec!(1.00739));
const SODIUM: (Decimal, Decimal) = (dec!(22.989218), dec!(22.98922));
const POTASSIUM: (Decimal, Decimal) = (dec!(38.963158), dec!(39.09775));
const AMMONIUM: (Decimal, Decimal) = (dec!(18.033826), dec!(18.03791));

// Unit Tests ==========================================================================================================

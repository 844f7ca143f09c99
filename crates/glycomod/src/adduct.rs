// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// External Crate Imports
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// Local Crate Imports
use crate::{Composition, Error, MassType, ReducingEnd, Result};

// Constants ===========================================================================================================

const IONS_DECIMAL_PLACES: u32 = 4;

// NOTE: Only a proton is ever removed in negative mode
const DEPROTONATION: Decimal = dec!(-1.007276);
const ACETATE: Decimal = dec!(59.013851);
const TRIFLUOROACETATE: Decimal = dec!(112.985587);

// Public API ==========================================================================================================

/// A name and mass for an ion the search service doesn't know about
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CustomAdduct {
    pub name: String,
    pub mass: Decimal,
}

/// The ion the submitted masses were measured with
#[derive(Clone, PartialEq, Debug, Default)]
pub enum Adduct {
    #[default]
    Proton,
    Sodium,
    Potassium,
    OtherPositive(CustomAdduct),
    Deprotonated,
    Neutral,
    Acetate,
    Trifluoroacetate,
    OtherNegative(CustomAdduct),
}

impl Adduct {
    pub const LABELS: [&'static str; 9] = [
        "H+",
        "Na+",
        "K+",
        "Pos_other",
        "H-",
        "M",
        "Ac",
        "TFA",
        "Neg_other",
    ];

    /// Looks up an adduct by its label. The two "other" adducts need a name and mass supplied via `custom`.
    pub fn resolve(label: &str, custom: Option<&CustomAdduct>) -> Result<Self> {
        let custom_adduct = || {
            custom.cloned().ok_or_else(|| Error::InvalidParameter {
                field: "adduct",
                reason: format!("the {label} adduct needs a custom name and mass"),
            })
        };
        Ok(match label {
            "H+" => Self::Proton,
            "Na+" => Self::Sodium,
            "K+" => Self::Potassium,
            "Pos_other" => Self::OtherPositive(custom_adduct()?),
            "H-" => Self::Deprotonated,
            "M" => Self::Neutral,
            "Ac" => Self::Acetate,
            "TFA" => Self::Trifluoroacetate,
            "Neg_other" => Self::OtherNegative(custom_adduct()?),
            _ => {
                return Err(Error::UnsupportedAdduct {
                    adduct: label.to_owned(),
                });
            }
        })
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Proton => "H+",
            Self::Sodium => "Na+",
            Self::Potassium => "K+",
            Self::OtherPositive(_) => "Pos_other",
            Self::Deprotonated => "H-",
            Self::Neutral => "M",
            Self::Acetate => "Ac",
            Self::Trifluoroacetate => "TFA",
            Self::OtherNegative(_) => "Neg_other",
        }
    }

    /// The value of the search form's `adducts` field
    #[must_use]
    pub const fn form_value(&self) -> &'static str {
        match self {
            Self::Proton => "mplus",
            Self::Sodium => "na",
            Self::Potassium => "k",
            Self::OtherPositive(_) => "otherplus",
            Self::Deprotonated => "mminus",
            Self::Neutral => "neutral",
            Self::Acetate => "acetate",
            Self::Trifluoroacetate => "tfa",
            Self::OtherNegative(_) => "otherminus",
        }
    }

    #[must_use]
    pub fn mass(&self, mass_type: MassType) -> Decimal {
        match self {
            Self::Proton => mass_type.proton(),
            Self::Sodium => mass_type.sodium(),
            Self::Potassium => mass_type.potassium(),
            Self::Deprotonated => DEPROTONATION,
            Self::Neutral => Decimal::ZERO,
            Self::Acetate => ACETATE,
            Self::Trifluoroacetate => TRIFLUOROACETATE,
            Self::OtherPositive(custom) | Self::OtherNegative(custom) => custom.mass,
        }
    }

    #[must_use]
    pub const fn is_positive(&self) -> bool {
        matches!(
            self,
            Self::Proton | Self::Sodium | Self::Potassium | Self::OtherPositive(_)
        )
    }

    #[must_use]
    pub const fn custom(&self) -> Option<&CustomAdduct> {
        match self {
            Self::OtherPositive(custom) | Self::OtherNegative(custom) => Some(custom),
            _ => None,
        }
    }
}

impl Display for Adduct {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.custom() {
            Some(CustomAdduct { name, .. }) => write!(f, "{} ({name})", self.label()),
            None => write!(f, "{}", self.label()),
        }
    }
}

/// Theoretical masses for the common positive ions of a composition, all rounded to 4 decimal places
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct AdductIons {
    /// `[M+H]+`
    pub h: Decimal,
    /// `[M+Na]+`
    pub na: Decimal,
    /// `[M+K]+`
    pub k: Decimal,
    /// `[M+NH4]+`
    pub nh4: Decimal,
    /// `[M+2H]2+`
    pub h2: Decimal,
    /// `[M+H+Na]2+`
    pub h_na: Decimal,
    /// `[M+H+K]2+`
    pub h_k: Decimal,
    /// `[M+2Na]2+`
    pub na2: Decimal,
}

impl AdductIons {
    #[must_use]
    pub fn new(composition: &Composition, mass_type: MassType, reducing_end: &ReducingEnd) -> Self {
        let m = composition.neutral_mass(mass_type) + reducing_end.mass();
        let h = mass_type.proton();
        let na = mass_type.sodium();
        let k = mass_type.potassium();
        let two = Decimal::TWO;

        let singly = |ion: Decimal| (m + ion).round_dp(IONS_DECIMAL_PLACES);
        let doubly = |a: Decimal, b: Decimal| ((m + a + b) / two).round_dp(IONS_DECIMAL_PLACES);
        Self {
            h: singly(h),
            na: singly(na),
            k: singly(k),
            nh4: singly(mass_type.ammonium()),
            h2: doubly(h, h),
            h_na: doubly(h, na),
            h_k: doubly(h, k),
            na2: doubly(na, na),
        }
    }
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_adducts() {
        for label in Adduct::LABELS {
            let custom = CustomAdduct {
                name: "Li".to_owned(),
                mass: dec!(7.015455),
            };
            let adduct = Adduct::resolve(label, Some(&custom)).unwrap();
            assert_eq!(adduct.label(), label);
        }
        assert_eq!(Adduct::resolve("Na+", None), Ok(Adduct::Sodium));
        assert_eq!(
            Adduct::resolve("Li+", None),
            Err(Error::UnsupportedAdduct {
                adduct: "Li+".to_owned()
            })
        );
        assert!(matches!(
            Adduct::resolve("Pos_other", None),
            Err(Error::InvalidParameter { field: "adduct", .. })
        ));
    }

    #[test]
    fn adduct_properties() {
        let mono = MassType::Monoisotopic;
        assert_eq!(Adduct::Proton.mass(mono), dec!(1.007276));
        assert_eq!(Adduct::Deprotonated.mass(mono), dec!(-1.007276));
        assert_eq!(Adduct::Neutral.mass(mono), Decimal::ZERO);
        assert_eq!(Adduct::Sodium.form_value(), "na");
        assert_eq!(Adduct::Trifluoroacetate.form_value(), "tfa");
        assert!(Adduct::Potassium.is_positive());
        assert!(!Adduct::Acetate.is_positive());

        let lithium = Adduct::OtherPositive(CustomAdduct {
            name: "Li".to_owned(),
            mass: dec!(7.015455),
        });
        assert_eq!(lithium.mass(mono), dec!(7.015455));
        assert_eq!(lithium.form_value(), "otherplus");
        assert_eq!(lithium.to_string(), "Pos_other (Li)");
        assert_eq!(Adduct::Proton.to_string(), "H+");
    }

    #[test]
    fn ions_of_the_core() {
        let core: Composition = "(Hex)3 (HexNAc)2".parse().unwrap();
        let ions = AdductIons::new(&core, MassType::Monoisotopic, &ReducingEnd::Free);
        assert_eq!(ions.h, dec!(911.3351));
        assert_eq!(ions.na, dec!(933.3170));
        assert_eq!(ions.k, dec!(949.2909));
        assert_eq!(ions.nh4, dec!(928.3616));
        assert_eq!(ions.h2, dec!(456.1712));
        assert_eq!(ions.h_na, dec!(467.1621));
        assert_eq!(ions.h_k, dec!(475.1491));
        assert_eq!(ions.na2, dec!(478.1531));
    }

    #[test]
    fn ions_with_a_tag() {
        let core: Composition = "(Hex)3 (HexNAc)2".parse().unwrap();
        let free = AdductIons::new(&core, MassType::Monoisotopic, &ReducingEnd::Free);
        let labelled = AdductIons::new(&core, MassType::Monoisotopic, &ReducingEnd::TwoAb);
        assert_eq!(labelled.h, dec!(1031.4039));
        assert_eq!(labelled.h - free.h, dec!(120.0688));

        let average = AdductIons::new(&core, MassType::Average, &ReducingEnd::Free);
        assert_eq!(average.h, dec!(911.8399));
    }
}

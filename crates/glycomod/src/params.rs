// External Crate Imports
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Local Crate Imports
use crate::{Adduct, CustomAdduct, Error, MassType, Monosaccharide, Result};

// Public API ==========================================================================================================

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToleranceUnit {
    #[default]
    Dalton,
    Ppm,
}

impl ToleranceUnit {
    #[must_use]
    pub const fn form_value(self) -> &'static str {
        match self {
            Self::Dalton => "Dalton",
            Self::Ppm => "ppm",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Linkage {
    #[default]
    N,
    O,
}

impl Linkage {
    #[must_use]
    pub const fn form_value(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::O => "O",
        }
    }
}

/// How N-linked glycans were released from their protein
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NForm {
    #[default]
    Free,
    Derivatised,
    Reduced,
    EndoReleased,
    Glycopeptides,
}

impl NForm {
    #[must_use]
    pub const fn form_value(self) -> &'static str {
        match self {
            Self::Free => "Free / PNGase released oligosaccharides",
            Self::Derivatised => "Derivatised oligosaccharides",
            Self::Reduced => "Reduced oligosaccharides",
            Self::EndoReleased => "ENDO H or ENDO F released oligosaccharides",
            Self::Glycopeptides => "Glycopeptides (motif N-X-S/T/C (X not P) will be used)",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OForm {
    Free,
    Reduced,
    Derivatised,
    #[default]
    Glycopeptides,
}

impl OForm {
    #[must_use]
    pub const fn form_value(self) -> &'static str {
        match self {
            Self::Free => "Free oligosaccharides",
            Self::Reduced => "Reduced oligosaccharides",
            Self::Derivatised => "Derivatised oligosaccharides",
            Self::Glycopeptides => "Glycopeptides (only those containing S or T will be used)",
        }
    }
}

/// Chemical modification applied to every residue before measurement
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidueMode {
    #[default]
    Underivatised,
    Permethylated,
    Peracetylated,
}

impl ResidueMode {
    #[must_use]
    pub const fn form_value(self) -> &'static str {
        match self {
            Self::Underivatised => "underivatised",
            Self::Permethylated => "permethylated",
            Self::Peracetylated => "peracetylated",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Required,
    #[default]
    Possible,
    Excluded,
}

impl Presence {
    #[must_use]
    pub const fn form_value(self) -> &'static str {
        match self {
            Self::Required => "yes",
            Self::Possible => "possible",
            Self::Excluded => "no",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonosaccharideRule {
    pub presence: Presence,
    pub low: Option<u32>,
    pub high: Option<u32>,
}

impl MonosaccharideRule {
    #[must_use]
    pub const fn new(presence: Presence) -> Self {
        Self {
            presence,
            low: None,
            high: None,
        }
    }

    #[must_use]
    pub const fn at_least(low: u32) -> Self {
        Self {
            presence: Presence::Required,
            low: Some(low),
            high: None,
        }
    }
}

/// One rule per monosaccharide, so every residue the service knows is always accounted for
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MonosaccharideRules {
    pub hex: MonosaccharideRule,
    pub hex_nac: MonosaccharideRule,
    pub deoxyhexose: MonosaccharideRule,
    pub neu_ac: MonosaccharideRule,
    pub neu_gc: MonosaccharideRule,
    pub pent: MonosaccharideRule,
    pub sulph: MonosaccharideRule,
    pub phos: MonosaccharideRule,
    pub kdn: MonosaccharideRule,
    pub hex_a: MonosaccharideRule,
}

impl MonosaccharideRules {
    #[must_use]
    pub const fn get(&self, monosaccharide: Monosaccharide) -> &MonosaccharideRule {
        match monosaccharide {
            Monosaccharide::Hex => &self.hex,
            Monosaccharide::HexNAc => &self.hex_nac,
            Monosaccharide::Deoxyhexose => &self.deoxyhexose,
            Monosaccharide::NeuAc => &self.neu_ac,
            Monosaccharide::NeuGc => &self.neu_gc,
            Monosaccharide::Pent => &self.pent,
            Monosaccharide::Sulph => &self.sulph,
            Monosaccharide::Phos => &self.phos,
            Monosaccharide::Kdn => &self.kdn,
            Monosaccharide::HexA => &self.hex_a,
        }
    }

    pub fn get_mut(&mut self, monosaccharide: Monosaccharide) -> &mut MonosaccharideRule {
        match monosaccharide {
            Monosaccharide::Hex => &mut self.hex,
            Monosaccharide::HexNAc => &mut self.hex_nac,
            Monosaccharide::Deoxyhexose => &mut self.deoxyhexose,
            Monosaccharide::NeuAc => &mut self.neu_ac,
            Monosaccharide::NeuGc => &mut self.neu_gc,
            Monosaccharide::Pent => &mut self.pent,
            Monosaccharide::Sulph => &mut self.sulph,
            Monosaccharide::Phos => &mut self.phos,
            Monosaccharide::Kdn => &mut self.kdn,
            Monosaccharide::HexA => &mut self.hex_a,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Monosaccharide, &MonosaccharideRule)> {
        Monosaccharide::ALL.into_iter().map(|m| (m, self.get(m)))
    }
}

// NOTE: By default, only N-glycans containing the (Hex)3 (HexNAc)2 core are searched for
impl Default for MonosaccharideRules {
    fn default() -> Self {
        let possible = MonosaccharideRule::new(Presence::Possible);
        let excluded = MonosaccharideRule::new(Presence::Excluded);
        Self {
            hex: MonosaccharideRule::at_least(3),
            hex_nac: MonosaccharideRule::at_least(2),
            deoxyhexose: possible,
            neu_ac: possible,
            neu_gc: excluded,
            pent: excluded,
            sulph: possible,
            phos: possible,
            kdn: excluded,
            hex_a: possible,
        }
    }
}

/// Everything about a composition search besides the masses themselves
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParameters {
    pub mass_type: MassType,
    pub tolerance: f64,
    pub tolerance_unit: ToleranceUnit,
    pub adduct: String,
    pub custom_adduct: Option<CustomAdduct>,
    pub linkage: Linkage,
    pub n_form: NForm,
    pub o_form: OForm,
    pub residue_mode: ResidueMode,
    pub derivative_name: Option<String>,
    pub derivative_mass: Option<Decimal>,
    pub monosaccharides: MonosaccharideRules,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            mass_type: MassType::default(),
            tolerance: 0.5,
            tolerance_unit: ToleranceUnit::default(),
            adduct: Adduct::default().label().to_owned(),
            custom_adduct: None,
            linkage: Linkage::default(),
            n_form: NForm::default(),
            o_form: OForm::default(),
            residue_mode: ResidueMode::default(),
            derivative_name: None,
            derivative_mass: None,
            monosaccharides: MonosaccharideRules::default(),
        }
    }
}

impl SearchParameters {
    pub fn adduct(&self) -> Result<Adduct> {
        Adduct::resolve(&self.adduct, self.custom_adduct.as_ref())
    }

    /// Whether the selected glycan form expects a derivative name and mass
    #[must_use]
    pub fn is_derivatised(&self) -> bool {
        match self.linkage {
            Linkage::N => self.n_form == NForm::Derivatised,
            Linkage::O => self.o_form == OForm::Derivatised,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(invalid(
                "tolerance",
                format!("expected a positive number, but got {}", self.tolerance),
            ));
        }

        self.adduct()?;

        let derivative_name = self.derivative_name.as_deref().filter(|n| !n.trim().is_empty());
        match (self.is_derivatised(), derivative_name, self.derivative_mass) {
            (true, Some(_), Some(_)) | (false, None, _) | (false, _, None) => (),
            (true, _, _) => {
                return Err(invalid(
                    "derivative",
                    "derivatised oligosaccharides need both a derivative name and mass",
                ));
            }
            (false, Some(_), Some(_)) => {
                return Err(invalid(
                    "derivative",
                    "a derivative name and mass were given, but derivatised oligosaccharides weren't selected",
                ));
            }
        }

        for (monosaccharide, rule) in self.monosaccharides.iter() {
            let field = monosaccharide.name();
            if rule.presence == Presence::Excluded && (rule.low.is_some() || rule.high.is_some()) {
                return Err(invalid(
                    field,
                    "an excluded monosaccharide can't have a count range",
                ));
            }
            if let (Some(low), Some(high)) = (rule.low, rule.high)
                && low > high
            {
                return Err(invalid(
                    field,
                    format!("the lower count ({low}) is above the upper count ({high})"),
                ));
            }
        }

        Ok(())
    }
}

// Private Functions ===================================================================================================

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
    let reason = reason.into();
    Error::InvalidParameter { field, reason }
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rust_decimal_macros::dec;

    use super::*;

    fn field_of(params: &SearchParameters) -> Option<&'static str> {
        match params.validate() {
            Err(Error::InvalidParameter { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn defaults_are_valid() {
        let params = SearchParameters::default();
        assert_eq!(params.validate(), Ok(()));
        assert_eq!(params.adduct(), Ok(Adduct::Proton));
        assert_eq!(params.monosaccharides.get(Monosaccharide::Hex).low, Some(3));
        assert_eq!(
            params.monosaccharides.get(Monosaccharide::Kdn).presence,
            Presence::Excluded
        );
        assert!(!params.is_derivatised());
    }

    #[test]
    fn invalid_tolerances() {
        for tolerance in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let params = SearchParameters {
                tolerance,
                ..SearchParameters::default()
            };
            assert_eq!(field_of(&params), Some("tolerance"));
        }
    }

    #[test]
    fn unsupported_adducts() {
        let params = SearchParameters {
            adduct: "Li+".to_owned(),
            ..SearchParameters::default()
        };
        assert!(matches!(
            params.validate(),
            Err(Error::UnsupportedAdduct { .. })
        ));
    }

    #[test]
    fn excluded_monosaccharides_have_no_range() {
        let mut params = SearchParameters::default();
        params.monosaccharides.get_mut(Monosaccharide::NeuGc).low = Some(1);
        assert_eq!(field_of(&params), Some("NeuGc"));

        let mut params = SearchParameters::default();
        *params.monosaccharides.get_mut(Monosaccharide::Pent) = MonosaccharideRule {
            presence: Presence::Possible,
            low: Some(3),
            high: Some(1),
        };
        assert_eq!(field_of(&params), Some("Pent"));
    }

    #[test]
    fn derivative_rules() {
        let derivatised = SearchParameters {
            n_form: NForm::Derivatised,
            ..SearchParameters::default()
        };
        assert_eq!(field_of(&derivatised), Some("derivative"));

        let named = SearchParameters {
            derivative_name: Some("2-AA".to_owned()),
            derivative_mass: Some(dec!(139.0633)),
            ..derivatised.clone()
        };
        assert_eq!(named.validate(), Ok(()));

        let undeclared = SearchParameters {
            n_form: NForm::Free,
            ..named.clone()
        };
        assert_eq!(field_of(&undeclared), Some("derivative"));

        // O-linked searches only care about the O-glycan form
        let o_linked = SearchParameters {
            linkage: Linkage::O,
            ..named
        };
        assert_eq!(field_of(&o_linked), Some("derivative"));
    }

    #[test]
    fn deserialize_partial_parameters() {
        let json = indoc! {r#"
            {
                "mass_type": "average",
                "tolerance": 100,
                "tolerance_unit": "ppm",
                "n_form": "reduced",
                "monosaccharides": {
                    "neu_gc": { "presence": "possible", "high": 2 }
                }
            }
        "#};
        let params: SearchParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.mass_type, MassType::Average);
        assert_eq!(params.tolerance, 100.0);
        assert_eq!(params.tolerance_unit.form_value(), "ppm");
        assert_eq!(params.n_form.form_value(), "Reduced oligosaccharides");
        assert_eq!(params.adduct, "H+");
        let neu_gc = params.monosaccharides.get(Monosaccharide::NeuGc);
        assert_eq!((neu_gc.presence, neu_gc.low, neu_gc.high), (Presence::Possible, None, Some(2)));
        // Anything left out keeps its default
        assert_eq!(params.monosaccharides.hex, MonosaccharideRule::at_least(3));
        assert_eq!(params.validate(), Ok(()));
    }
}

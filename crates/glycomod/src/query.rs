// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// External Crate Imports
use itertools::Itertools;
use peaks::{PeakNumber, PeakSelection};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer, ser::SerializeMap};
use tracing::debug;

// Local Crate Imports
use crate::{Adduct, Error, Linkage, MassType, Monosaccharide, NForm, OForm, ReducingEnd, Result, SearchParameters};

// Constants ===========================================================================================================

const MZ_DECIMAL_PLACES: u32 = 4;

// NOTE: Fields the service expects, but that only matter for glycopeptide searches
const PEPTIDE_FIELDS: [(&str, &str); 5] = [
    ("protein", ""),
    ("enzyme", "Trypsin"),
    ("MC", "0"),
    ("reagents", "nothing (in reduced form)"),
    ("peptidemasses", ""),
];

// Public API ==========================================================================================================

/// A selected peak, converted to the m/z it would have had as a singly charged ion
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SingleChargedMass {
    pub peak_number: PeakNumber,
    pub mz: Decimal,
}

impl Display for SingleChargedMass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} (peak {})", self.mz, self.peak_number)
    }
}

/// Converts every selection to its singly charged m/z, keeping the order of `selections`
pub fn normalize_masses(
    selections: &[PeakSelection],
    adduct: &Adduct,
    mass_type: MassType,
) -> Result<Vec<SingleChargedMass>> {
    let adduct_mass = adduct.mass(mass_type);
    selections
        .iter()
        .map(|&PeakSelection { peak_number, mass, charge }| {
            if !charge.is_determined() {
                return Err(Error::UndeterminedCharge { peak_number, mass });
            }
            let measured = mass
                .is_finite()
                .then(|| Decimal::from_f64_retain(mass))
                .flatten()
                .ok_or(Error::InvalidMass { peak_number, mass })?;

            let z = Decimal::from(charge.get());
            let mz = (measured * z - (z - Decimal::ONE) * adduct_mass)
                .round_dp(MZ_DECIMAL_PLACES)
                .normalize();
            Ok(SingleChargedMass { peak_number, mz })
        })
        .collect()
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum FormValue {
    Text(String),
    /// An empty file upload the service insists on receiving
    File { file_name: String },
}

impl FormValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File { .. } => None,
        }
    }
}

impl Serialize for FormValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::File { file_name } => (file_name, "").serialize(serializer),
        }
    }
}

/// The named fields of a composition search request, in the order the service's form declares them
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct QueryForm {
    fields: Vec<(String, FormValue)>,
}

impl QueryForm {
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Looks up a text field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .and_then(|(_, value)| value.as_text())
    }

    /// The submitted masses, one per line
    #[must_use]
    pub fn masses(&self) -> &str {
        self.get("Masses").unwrap_or_default()
    }

    fn text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), FormValue::Text(value.into())));
    }

    fn file(&mut self, name: impl Into<String>, file_name: impl Into<String>) {
        let file_name = file_name.into();
        self.fields.push((name.into(), FormValue::File { file_name }));
    }
}

impl Serialize for QueryForm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Builds the request for a composition search of `masses`. A tagged reducing end marks the glycans as derivatised,
/// with the tag standing in as the derivative.
pub fn build_query(
    masses: &[SingleChargedMass],
    params: &SearchParameters,
    reducing_end: &ReducingEnd,
) -> Result<QueryForm> {
    if masses.is_empty() {
        return Err(Error::EmptyInput);
    }
    params.validate()?;
    let adduct = params.adduct()?;

    let (mut n_form, mut o_form) = (params.n_form, params.o_form);
    let (derivative_name, derivative_mass) = if reducing_end.is_free() {
        (
            params.derivative_name.clone().unwrap_or_default(),
            params.derivative_mass.map(|m| m.to_string()).unwrap_or_default(),
        )
    } else {
        debug!("searching for glycans tagged with {reducing_end}");
        match params.linkage {
            Linkage::N => n_form = NForm::Derivatised,
            Linkage::O => o_form = OForm::Derivatised,
        }
        (
            reducing_end.name().to_owned(),
            reducing_end.full_mass().to_string(),
        )
    };

    let custom = adduct.custom();
    let custom_name = custom.map(|c| c.name.clone()).unwrap_or_default();
    let custom_mass = custom.map(|c| c.mass.to_string()).unwrap_or_default();
    let (positive, negative) = if adduct.is_positive() {
        ((custom_name, custom_mass), Default::default())
    } else {
        (Default::default(), (custom_name, custom_mass))
    };

    let mut form = QueryForm::default();
    form.text("Masses", masses.iter().map(|m| m.mz).join("\n"));
    form.text("masses", params.mass_type.form_value());
    form.file("name", "upfile");
    form.text("Tolerance", params.tolerance.to_string());
    form.text("D_or_ppm", params.tolerance_unit.form_value());
    form.text("adducts", adduct.form_value());
    form.text("adduct_name1", positive.0);
    form.text("adduct_mass1", positive.1);
    form.text("adduct_name", negative.0);
    form.text("adduct_mass", negative.1);
    form.text("linked", params.linkage.form_value());
    form.text("Nform", n_form.form_value());
    form.text("Oform", o_form.form_value());
    for (name, value) in PEPTIDE_FIELDS {
        form.text(name, value);
    }
    form.text("derivative_name", derivative_name);
    form.text("derivative_mass", derivative_mass);
    form.text("dummy", "");
    form.text("mode", params.residue_mode.form_value());

    let count = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();
    for monosaccharide in Monosaccharide::ALL {
        let rule = params.monosaccharides.get(monosaccharide);
        let name = monosaccharide.name();
        form.text(format!("{name}pres"), rule.presence.form_value());
        form.text(format!("{name}nb1"), count(rule.low));
        form.text(format!("{name}nb2"), count(rule.high));
    }

    Ok(form)
}

// Unit Tests ==========================================================================================================

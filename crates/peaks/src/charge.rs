// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// External Crate Imports
use derive_more::Into;
use tracing::warn;

// Local Crate Imports
use crate::{Error, Result};

// Constants ===========================================================================================================

// NOTE: Isotope peaks sit roughly 1/z apart. A spacing landing exactly on a boundary belongs to the lower charge
const SPACING_TIERS: [(f64, u8); 4] = [(0.27, 4), (0.40, 3), (0.60, 2), (1.15, 1)];

// Public API ==========================================================================================================

/// An ion charge between 1 and 4, or 0 when it couldn't be determined
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Into)]
pub struct ChargeState(u8);

impl ChargeState {
    pub const UNDETERMINED: Self = Self(0);
    pub const MAX: u8 = 4;

    #[must_use]
    pub fn new(charge: u8) -> Option<Self> {
        (charge <= Self::MAX).then_some(Self(charge))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_determined(self) -> bool {
        self.0 != 0
    }
}

impl Display for ChargeState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[must_use]
pub fn charge_from_spacing(spacing: f64) -> Option<ChargeState> {
    SPACING_TIERS
        .iter()
        .find(|&&(limit, _)| spacing < limit)
        .map(|&(_, charge)| ChargeState(charge))
}

/// Infers the charge of the centroided peak at `target` from the distance to the next peak up. `target` must be
/// present in `mz`, which must be sorted in ascending order.
pub fn estimate_charge(mz: &[f64], target: f64) -> Result<ChargeState> {
    let index = mz
        .binary_search_by(|x| x.total_cmp(&target))
        .map_err(|_| Error::charge_indeterminate(target, "the peak is not present in the spectrum"))?;
    let next = mz
        .get(index + 1)
        .ok_or_else(|| Error::charge_indeterminate(target, "no peak follows it"))?;

    let spacing = next - target;
    charge_from_spacing(spacing).ok_or_else(|| {
        Error::charge_indeterminate(
            target,
            format!("the next peak is {spacing:.4} away, which is too far to be an isotope"),
        )
    })
}

/// Like [`estimate_charge`], but logs failures and reports them as [`ChargeState::UNDETERMINED`]
#[must_use]
pub fn charge_or_undetermined(mz: &[f64], target: f64) -> ChargeState {
    estimate_charge(mz, target).unwrap_or_else(|error| {
        warn!("{error}");
        ChargeState::UNDETERMINED
    })
}

// Unit Tests ==========================================================================================================

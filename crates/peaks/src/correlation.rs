// External Crate Imports
use tracing::{debug, warn};

// Local Crate Imports
use crate::{ChargeState, Result, Spectrum, charge_or_undetermined, closest_point, estimate_charge, round_dp};

// Constants ===========================================================================================================

const MZ_DECIMAL_PLACES: u32 = 4;

// Public API ==========================================================================================================

/// A peak picked out of a spectrum, along with the charge read from the isotopes that follow it
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Correlation {
    pub mz: f64,
    pub charge: ChargeState,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct BasePeak {
    pub retention_time: f64,
    pub mz: f64,
    pub charge: ChargeState,
}

/// Snaps two m/z positions (usually a pair of clicks) to the nearest data points, then estimates the charge of the
/// lower one using only the points between them. An undetermined charge is logged, not returned as an error.
pub fn correlate(spectrum: &Spectrum, first: f64, second: f64) -> Result<Correlation> {
    let mz = spectrum.mz();
    let mut lo = closest_point(mz, first)?;
    let mut hi = closest_point(mz, second)?;
    if hi < lo {
        warn!("the first m/z ({lo}) is above the second ({hi}), so they've been swapped");
        (lo, hi) = (hi, lo);
    }

    let start = mz.partition_point(|&x| x < lo);
    let end = mz.partition_point(|&x| x <= hi);
    let charge = charge_or_undetermined(&mz[start..end], lo);

    Ok(Correlation {
        mz: round_dp(lo, MZ_DECIMAL_PLACES),
        charge,
    })
}

/// Reads the charge of each spectrum's base peak, keeping only those where it could be determined
pub fn base_peak_charges<'s>(spectra: impl IntoIterator<Item = &'s Spectrum>) -> Vec<BasePeak> {
    spectra
        .into_iter()
        .filter_map(|spectrum| {
            let (mz, _) = spectrum.base_peak()?;
            let retention_time = spectrum.retention_time();
            match estimate_charge(spectrum.mz(), mz) {
                Ok(charge) => Some(BasePeak {
                    retention_time,
                    mz,
                    charge,
                }),
                Err(error) => {
                    debug!("skipping the base peak at {retention_time} min: {error}");
                    None
                }
            }
        })
        .collect()
}

// Unit Tests ==========================================================================================================

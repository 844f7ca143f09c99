// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// Local Crate Imports
use crate::{Spectrum, round_dp};

// Constants ===========================================================================================================

// NOTE: (exclusive upper bound on the visible m/z width, bin size); wider ranges use `WIDEST_BIN`
const BIN_TIERS: [(f64, f64); 4] = [(50.0, 0.0), (100.0, 10.0), (200.0, 25.0), (500.0, 50.0)];
const WIDEST_BIN: f64 = 100.0;

// NOTE: (exclusive lower bound on the maximum intensity, fraction of that maximum a point must exceed)
const INTENSITY_TIERS: [(f64, f64); 3] = [(400_000.0, 0.005), (200_000.0, 0.01), (50_000.0, 0.05)];
const WEAKEST_FRACTION: f64 = 0.2;

const LABEL_DECIMAL_PLACES: u32 = 4;

// Public API ==========================================================================================================

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Annotation {
    pub mz: f64,
    pub intensity: f64,
}

impl Display for Annotation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.mz, self.intensity)
    }
}

/// The bin width used to thin out labels over a visible range `width` wide. Zero means "label everything".
#[must_use]
pub fn bin_size(width: f64) -> f64 {
    BIN_TIERS
        .iter()
        .find(|&&(limit, _)| width < limit)
        .map_or(WIDEST_BIN, |&(_, size)| size)
}

/// Picks the points to label in the visible range `(lo, hi]`: the most intense point of every bin, or every point
/// when the range is narrow enough not to need binning
#[must_use]
pub fn annotate_range(spectrum: &Spectrum, lo: f64, hi: f64) -> Vec<Annotation> {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let size = bin_size(hi - lo);

    if size == 0.0 {
        return points_in(spectrum, lo, hi)
            .map(|(mz, intensity)| annotation(mz, intensity))
            .collect();
    }

    let mut annotations = Vec::new();
    // NOTE: Bin edges are computed from `lo` each time, so floating-point error doesn't accumulate
    for bin in 0_u32.. {
        let start = f64::from(bin).mul_add(size, lo);
        if start >= hi {
            break;
        }
        let end = (start + size).min(hi);
        let tallest = points_in(spectrum, start, end)
            .reduce(|best, point| if point.1 > best.1 { point } else { best });
        if let Some((mz, intensity)) = tallest {
            annotations.push(annotation(mz, intensity));
        }
    }
    annotations
}

/// The fraction of the maximum intensity a point must exceed to be labelled when there is no visible range to bin
#[must_use]
pub fn intensity_fraction(max_intensity: f64) -> f64 {
    INTENSITY_TIERS
        .iter()
        .find(|&&(floor, _)| max_intensity > floor)
        .map_or(WEAKEST_FRACTION, |&(_, fraction)| fraction)
}

#[must_use]
pub fn prominent_points(spectrum: &Spectrum) -> Vec<Annotation> {
    let Some((_, max_intensity)) = spectrum.base_peak() else {
        return Vec::new();
    };
    let threshold = max_intensity * intensity_fraction(max_intensity);

    spectrum
        .points()
        .filter(|&(_, intensity)| intensity > threshold)
        .map(|(mz, intensity)| annotation(mz, intensity))
        .collect()
}

#[must_use]
pub fn annotate_view(spectrum: &Spectrum, visible_range: Option<(f64, f64)>) -> Vec<Annotation> {
    match visible_range {
        Some((lo, hi)) => annotate_range(spectrum, lo, hi),
        None => prominent_points(spectrum),
    }
}

// Private Functions ===================================================================================================

/// Points with `start < m/z <= end`, so a point exactly at `start` is left out and belongs to the bin before
fn points_in(spectrum: &Spectrum, start: f64, end: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
    let mz = spectrum.mz();
    let first = mz.partition_point(|&x| x <= start);
    let last = mz.partition_point(|&x| x <= end);
    let range = first..last.max(first);
    mz[range.clone()]
        .iter()
        .copied()
        .zip(spectrum.intensity()[range].iter().copied())
}

fn annotation(mz: f64, intensity: f64) -> Annotation {
    let mz = round_dp(mz, LABEL_DECIMAL_PLACES);
    Annotation { mz, intensity }
}

// Unit Tests ==========================================================================================================

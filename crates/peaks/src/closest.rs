// Local Crate Imports
use crate::{Error, Result};

// Public API ==========================================================================================================

/// Returns the value in `xs` closest to `query`, with the smaller value winning an exact tie. `xs` must be sorted in
/// ascending order; queries outside of its range clamp to the first or last value.
pub fn closest_point(xs: &[f64], query: f64) -> Result<f64> {
    let (&first, &last) = xs.first().zip(xs.last()).ok_or(Error::EmptyInput)?;

    // NOTE: A "bisect left", giving the first index whose value is not less than `query`
    let position = xs.partition_point(|&x| x < query);
    if position == 0 {
        return Ok(first);
    }
    if position == xs.len() {
        return Ok(last);
    }

    let before = xs[position - 1];
    let after = xs[position];
    Ok(if after - query < query - before {
        after
    } else {
        before
    })
}

// Unit Tests ==========================================================================================================

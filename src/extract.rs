//! Turns the denoised grid into a weighted point set.

use log::debug;

use crate::cluster::{Pixel, PointSet};
use crate::config::Weighting;
use crate::error::{ClusterError, Result};
use crate::grid::Grid;

/// Selects the cells of `denoised` that round to a non-zero value
///
/// Rounding is half-to-even, so a cell must exceed 0.5 in magnitude to
/// survive. Each selected cell takes its weight from `weight_image` at the
/// same coordinate, truncated to an integer; weights below 1 are raised
/// to 1. With [`Weighting::Uniform`] every weight is 1.
///
/// # Errors
///
/// `ShapeMismatch` if the two grids differ in shape, `EmptyInput` if no
/// cell survives.
pub fn extract(denoised: &Grid, weight_image: &Grid, weighting: Weighting) -> Result<PointSet> {
    weight_image.expect_shape(denoised.rows(), denoised.cols())?;

    let mut points = PointSet::new();
    for (r, c, v) in denoised.iter_nonzero() {
        if v.round_ties_even() == 0.0 {
            continue;
        }
        let weight = match weighting {
            Weighting::Uniform => 1,
            Weighting::Intensity => sample_weight(weight_image.get(r, c)),
        };
        points.push(Pixel::new(r as i32, c as i32), weight);
    }

    debug!("extracted {} points from a {:?} grid", points.len(), denoised.shape());
    if points.is_empty() {
        return Err(ClusterError::EmptyInput);
    }
    Ok(points)
}

/// Integer weight of a raw intensity, truncated toward zero
#[inline]
fn sample_weight(v: f64) -> u32 {
    if v.is_nan() || v < 1.0 {
        1
    } else {
        // `as` saturates at u32::MAX
        v.trunc() as u32
    }
}

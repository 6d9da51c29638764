//! Neighbourhood-density noise filter for the rebinned edge map.

use log::debug;

use crate::error::Result;
use crate::grid::Grid;

/// Zeroes sparse cells of a `grid_size × grid_size` rebinned grid.
///
/// Interior cells are visited in row-major order. A non-zero cell is cleared
/// when the mean of its 3×3 block (itself included) is below
/// `min_neighbor_avg`. The pass works on a copy but sees its own earlier
/// clearings, so a cell can lose support from a neighbour removed just
/// before it. Border cells are never touched.
///
/// The input is left untouched; an all-zero grid comes back all zero.
pub fn reduce(grid: &Grid, grid_size: usize, min_neighbor_avg: f64) -> Result<Grid> {
    grid.expect_shape(grid_size, grid_size)?;

    let mut out = grid.clone();
    let mut removed = 0usize;
    if grid_size < 3 {
        return Ok(out);
    }

    for r in 1..grid_size - 1 {
        for c in 1..grid_size - 1 {
            if out.get(r, c) == 0.0 {
                continue;
            }
            if block_mean(&out, r, c) < min_neighbor_avg {
                out.set(r, c, 0.0);
                removed += 1;
            }
        }
    }

    debug!("noise reduction cleared {} of {} cells", removed, grid_size * grid_size);
    Ok(out)
}

/// Mean of the 3×3 block centred on an interior cell
#[inline]
fn block_mean(grid: &Grid, r: usize, c: usize) -> f64 {
    let mut sum = 0.0;
    for rr in r - 1..=r + 1 {
        sum += grid.row(rr)[c - 1..=c + 1].iter().sum::<f64>();
    }
    sum / 9.0
}

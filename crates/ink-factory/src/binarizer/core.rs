use super::types::{Mask, PixelGrid};
use super::utils::is_ink;
use rayon::prelude::*;

/// Thresholds an RGB grid into a fresh mask.
pub fn binarize(grid: &PixelGrid, threshold: u8) -> Mask {
    let mut mask = Mask::default();
    binarize_into(grid, threshold, &mut mask);
    mask
}

/// Thresholds into a caller-owned mask, reusing its allocation.
///
/// Rows are independent, so each worker reads one input row and writes the
/// matching output row.
pub fn binarize_into(grid: &PixelGrid, threshold: u8, mask: &mut Mask) {
    let width = grid.width();
    mask.reshape(width, grid.height());

    mask.cells_mut()
        .par_chunks_mut(width)
        .zip(grid.as_bytes().par_chunks(width * PixelGrid::CHANNELS))
        .for_each(|(out_row, in_row)| fill_row(out_row, in_row, threshold));
}

/// Single-threaded [`binarize_into`], for callers that already run one frame
/// per worker and hold thread-local scratch across the call.
pub fn binarize_serial_into(grid: &PixelGrid, threshold: u8, mask: &mut Mask) {
    let width = grid.width();
    mask.reshape(width, grid.height());

    for (out_row, in_row) in mask
        .cells_mut()
        .chunks_mut(width)
        .zip(grid.as_bytes().chunks(width * PixelGrid::CHANNELS))
    {
        fill_row(out_row, in_row, threshold);
    }
}

#[inline]
fn fill_row(out_row: &mut [bool], in_row: &[u8], threshold: u8) {
    for (cell, px) in out_row.iter_mut().zip(in_row.chunks_exact(PixelGrid::CHANNELS)) {
        *cell = is_ink(px[0], px[1], px[2], threshold);
    }
}

use super::core::Tiler;
use crate::error::{FactoryError, Result};
use ink_core::PixelRect;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Grid-space rectangle produced by the tiler.
///
/// Kept wider than the wire format so an oversized grid is reported as
/// [`FactoryError::CoordinateOverflow`] when serialized instead of being
/// truncated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 4]", into = "[usize; 4]")]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

/// Rectangles of one frame, in discovery order.
pub type Frame = Vec<Rect>;

impl Rect {
    pub const fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> usize {
        self.w * self.h
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    pub fn to_pixel_rect(&self) -> Result<PixelRect> {
        let narrow = |v: usize| u16::try_from(v).ok();
        match (narrow(self.x), narrow(self.y), narrow(self.w), narrow(self.h)) {
            (Some(x), Some(y), Some(w), Some(h)) => Ok(PixelRect { x, y, w, h }),
            _ => Err(FactoryError::CoordinateOverflow {
                x: self.x,
                y: self.y,
                w: self.w,
                h: self.h,
            }),
        }
    }
}

impl From<PixelRect> for Rect {
    fn from(r: PixelRect) -> Self {
        Self::new(r.x as usize, r.y as usize, r.w as usize, r.h as usize)
    }
}

impl From<[usize; 4]> for Rect {
    fn from([x, y, w, h]: [usize; 4]) -> Self {
        Self { x, y, w, h }
    }
}

impl From<Rect> for [usize; 4] {
    fn from(r: Rect) -> Self {
        [r.x, r.y, r.w, r.h]
    }
}

/// Cells already claimed by a rectangle during one tiling pass.
///
/// Same row-major layout as [`crate::binarizer::Mask`].
#[derive(Debug, Default)]
pub struct VisitedSet {
    cells: Vec<bool>,
    width: usize,
}

impl VisitedSet {
    /// Clears the set for a `width` x `height` grid, keeping the allocation.
    pub fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.cells.clear();
        self.cells.resize(width * height, false);
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[bool] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Marks every cell of `rect` as visited.
    pub fn claim(&mut self, rect: &Rect) {
        for y in rect.y..rect.y + rect.h {
            let start = y * self.width + rect.x;
            self.cells[start..start + rect.w].fill(true);
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.capacity()
    }
}

// One tiler per worker thread, so visited buffers are pooled without sharing.
thread_local! {
    pub static SCRATCH_TILER: RefCell<Tiler> = RefCell::new(Tiler::new());
}

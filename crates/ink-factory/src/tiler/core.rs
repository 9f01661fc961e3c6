use super::types::{Frame, Rect, VisitedSet, SCRATCH_TILER};
use crate::binarizer::Mask;
use rayon::prelude::*;

/// Greedy rectangle decomposition of a mask.
///
/// Owns its visited buffer so repeated calls on same-sized frames do not
/// allocate.
#[derive(Debug, Default)]
pub struct Tiler {
    visited: VisitedSet,
}

impl Tiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Covers every ink cell of `mask` with disjoint rectangles.
    ///
    /// Scans rows top to bottom, columns left to right. Each unclaimed ink
    /// cell anchors a rectangle grown downward while its width can only
    /// shrink; the largest area seen wins, the shortest one on ties. After a
    /// rectangle is placed the cursor jumps past its width.
    pub fn tile(&mut self, mask: &Mask) -> Frame {
        let width = mask.width();
        let height = mask.height();
        self.visited.reset(width, height);

        let mut rects = Frame::new();

        for y in 0..height {
            let mut x = 0;
            while x < width {
                if !self.is_open(mask, x, y) {
                    x += 1;
                    continue;
                }

                let limit_w = self.open_run(mask, x, y, width - x);

                let mut current_w = limit_w;
                let mut max_area = 0;
                let mut max_w = 0;
                let mut max_h = 0;

                for h_scan in 0..height - y {
                    let valid_w = self.open_run(mask, x, y + h_scan, current_w);
                    current_w = current_w.min(valid_w);
                    if current_w == 0 {
                        break;
                    }

                    let area = current_w * (h_scan + 1);
                    if area > max_area {
                        max_area = area;
                        max_w = current_w;
                        max_h = h_scan + 1;
                    }
                }

                if max_w > 0 && max_h > 0 {
                    let rect = Rect::new(x, y, max_w, max_h);
                    self.visited.claim(&rect);
                    rects.push(rect);
                    x += max_w;
                    continue;
                }

                // Unreachable for an open anchor; keeps the scan moving.
                x += 1;
            }
        }

        rects
    }

    #[inline]
    fn is_open(&self, mask: &Mask, x: usize, y: usize) -> bool {
        mask.get(x, y) && !self.visited.row(y)[x]
    }

    /// Length of the run of unvisited ink cells starting at `(x, y)`,
    /// looking at no more than `max` cells.
    #[inline]
    fn open_run(&self, mask: &Mask, x: usize, y: usize, max: usize) -> usize {
        let start = y * mask.width() + x;
        let ink = &mask.cells()[start..start + max];
        let visited = &self.visited.row(y)[x..x + max];
        ink.iter()
            .zip(visited)
            .take_while(|&(&ink, &seen)| ink && !seen)
            .count()
    }
}

/// Tiles a mask with the calling thread's pooled [`Tiler`].
pub fn tile_mask(mask: &Mask) -> Frame {
    SCRATCH_TILER.with(|cell| cell.borrow_mut().tile(mask))
}

/// Tiles independent frames concurrently. Output order matches input order.
pub fn tile_frames(masks: &[Mask]) -> Vec<Frame> {
    masks.par_iter().map(tile_mask).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_rows(rows: &[&str]) -> Frame {
        Tiler::new().tile(&Mask::from_rows(rows).unwrap())
    }

    #[test]
    fn known_small_case() {
        let rects = tile_rows(&["110", "110", "001"]);
        assert_eq!(rects, vec![Rect::new(0, 0, 2, 2), Rect::new(2, 2, 1, 1)]);
    }

    #[test]
    fn empty_mask_has_no_rects() {
        assert!(tile_rows(&["000", "000"]).is_empty());
    }

    #[test]
    fn single_pixel() {
        assert_eq!(tile_rows(&["1"]), vec![Rect::new(0, 0, 1, 1)]);
        assert!(tile_rows(&["0"]).is_empty());
    }

    #[test]
    fn full_mask_is_one_rect() {
        assert_eq!(
            tile_rows(&["1111", "1111", "1111"]),
            vec![Rect::new(0, 0, 4, 3)]
        );
    }

    #[test]
    fn single_row_and_column() {
        assert_eq!(
            tile_rows(&["11011"]),
            vec![Rect::new(0, 0, 2, 1), Rect::new(3, 0, 2, 1)]
        );
        assert_eq!(
            tile_rows(&["1", "1", "0", "1"]),
            vec![Rect::new(0, 0, 1, 2), Rect::new(0, 3, 1, 1)]
        );
    }

    #[test]
    fn equal_area_keeps_the_flatter_rect() {
        // Row 0 alone gives 4x1 = 4, rows 0..2 give 2x2 = 4: first one wins.
        let rects = tile_rows(&["1111", "1100"]);
        assert_eq!(rects, vec![Rect::new(0, 0, 4, 1), Rect::new(0, 1, 2, 1)]);
    }

    #[test]
    fn taller_rect_wins_when_area_grows() {
        // 3x1 = 3 loses to 2x3 = 6.
        let rects = tile_rows(&["111", "110", "110"]);
        assert_eq!(rects, vec![Rect::new(0, 0, 2, 3), Rect::new(2, 0, 1, 1)]);
    }

    #[test]
    fn expansion_stops_at_first_empty_row() {
        let rects = tile_rows(&["11", "00", "11"]);
        assert_eq!(rects, vec![Rect::new(0, 0, 2, 1), Rect::new(0, 2, 2, 1)]);
    }

    #[test]
    fn claimed_cells_limit_later_anchors() {
        // The 1x3 column claimed first splits row 1 for the next anchor.
        let rects = tile_rows(&["1000", "1111", "1000"]);
        assert_eq!(rects, vec![Rect::new(0, 0, 1, 3), Rect::new(1, 1, 3, 1)]);
    }

    #[test]
    fn pooled_tiler_matches_fresh_tiler() {
        let a = Mask::from_rows(&["1011", "1111"]).unwrap();
        let b = Mask::from_rows(&["01", "10", "11"]).unwrap();
        for mask in [&a, &b, &a] {
            assert_eq!(tile_mask(mask), Tiler::new().tile(mask));
        }
    }

    #[test]
    fn parallel_frames_keep_input_order() {
        let masks: Vec<Mask> = (1..=6)
            .map(|w| Mask::from_cells(vec![true; w], w, 1).unwrap())
            .collect();
        let frames = tile_frames(&masks);
        for (w, frame) in (1..=6).zip(&frames) {
            assert_eq!(frame, &vec![Rect::new(0, 0, w, 1)]);
        }
    }

    #[test]
    fn default_mask_does_not_panic() {
        assert!(Tiler::new().tile(&Mask::default()).is_empty());
    }
}

use crate::binarizer::Mask;
use crate::error::Result;
use ink_core::PixelRect;

/// Adds one hit per covered pixel, clipping to the canvas.
///
/// Returns `false` when the rectangle had to be clipped.
pub fn draw_rect(hits: &mut [u8], width: usize, height: usize, rect: &PixelRect) -> bool {
    let x = rect.x as usize;
    let y = rect.y as usize;
    let right = (x + rect.w as usize).min(width);
    let bottom = (y + rect.h as usize).min(height);
    let inside = right == x + rect.w as usize && bottom == y + rect.h as usize;

    if x >= width || y >= height {
        return false;
    }

    for row in y..bottom {
        let start = row * width;
        for hit in &mut hits[start + x..start + right] {
            *hit = hit.saturating_add(1);
        }
    }
    inside
}

/// Rasterizes one frame back into a mask.
pub fn render_frame(rects: &[PixelRect], width: usize, height: usize) -> Result<Mask> {
    let mut hits = vec![0u8; width * height];
    for rect in rects {
        draw_rect(&mut hits, width, height, rect);
    }
    Mask::from_cells(hits.into_iter().map(|h| h > 0).collect(), width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clips_to_canvas() {
        let mut hits = vec![0u8; 9];
        assert!(!draw_rect(&mut hits, 3, 3, &PixelRect::new(2, 1, 4, 4)));
        assert_eq!(hits, [0, 0, 0, 0, 0, 1, 0, 0, 1]);
        assert!(!draw_rect(&mut hits, 3, 3, &PixelRect::new(5, 0, 1, 1)));
    }

    #[test]
    fn overlapping_rects_stack_hits() {
        let mut hits = vec![0u8; 4];
        assert!(draw_rect(&mut hits, 2, 2, &PixelRect::new(0, 0, 2, 1)));
        assert!(draw_rect(&mut hits, 2, 2, &PixelRect::new(1, 0, 1, 2)));
        assert_eq!(hits, [1, 2, 0, 1]);
    }

    #[test]
    fn renders_known_small_case() {
        let rects = [PixelRect::new(0, 0, 2, 2), PixelRect::new(2, 2, 1, 1)];
        let mask = render_frame(&rects, 3, 3).unwrap();
        assert_eq!(mask, Mask::from_rows(&["110", "110", "001"]).unwrap());
    }
}

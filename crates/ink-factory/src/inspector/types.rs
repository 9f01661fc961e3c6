/// Summary of a rectangle stream, as seen by a player rasterizing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectReport {
    pub width: usize,
    pub height: usize,
    pub frames: u64,
    pub total_rects: u64,
    /// Most rectangles in a single frame.
    pub max_rects: usize,
    pub busiest_frame: Option<u64>,
    /// Pixels drawn, summed over frames.
    pub ink_pixels: u64,
    /// Pixels drawn by more than one rectangle of the same frame.
    pub overlapping_pixels: u64,
    /// Rectangles that reach past the canvas and had to be clipped.
    pub out_of_bounds: u64,
}

impl InspectReport {
    pub fn is_clean(&self) -> bool {
        self.overlapping_pixels == 0 && self.out_of_bounds == 0
    }

    pub fn average_rects(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.total_rects as f64 / self.frames as f64
        }
    }
}

use crate::error::{FactoryError, Result};

/// Borrowed RGB frame, row-major, 3 bytes per pixel.
///
/// Pixel `(x, y)` (column, row) starts at byte `(y * width + x) * 3`.
#[derive(Debug, Clone, Copy)]
pub struct PixelGrid<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> PixelGrid<'a> {
    pub const CHANNELS: usize = 3;

    pub fn new(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(Self::CHANNELS));
        if width == 0 || height == 0 || expected != Some(data.len()) {
            return Err(FactoryError::InvalidDimensions {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * Self::CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Raw bytes of row `y`.
    pub fn row(&self, y: usize) -> &'a [u8] {
        let stride = self.width * Self::CHANNELS;
        &self.data[y * stride..(y + 1) * stride]
    }
}

/// Foreground/background grid. `true` is ink.
///
/// Row-major: cell `(x, y)` (column, row) is stored at `y * width + x`.
/// The tiler, the visited set and every emitted rectangle use the same
/// convention.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mask {
    cells: Vec<bool>,
    width: usize,
    height: usize,
}

impl Mask {
    /// All-background mask.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let len = width.checked_mul(height).unwrap_or(0);
        if len == 0 {
            return Err(FactoryError::InvalidDimensions {
                width,
                height,
                len: 0,
            });
        }
        Ok(Self {
            cells: vec![false; len],
            width,
            height,
        })
    }

    pub fn from_cells(cells: Vec<bool>, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 || width.checked_mul(height) != Some(cells.len()) {
            return Err(FactoryError::InvalidDimensions {
                width,
                height,
                len: cells.len(),
            });
        }
        Ok(Self {
            cells,
            width,
            height,
        })
    }

    /// Builds a mask from text rows where `1` or `#` is ink and anything
    /// else is background. Whitespace is ignored.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let parsed: Vec<Vec<bool>> = rows
            .iter()
            .map(|row| {
                row.as_ref()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| c == '1' || c == '#')
                    .collect()
            })
            .collect();
        let height = parsed.len();
        let width = parsed.first().map_or(0, Vec::len);
        let cells: Vec<bool> = parsed.into_iter().flatten().collect();
        Self::from_cells(cells, width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, ink: bool) {
        self.cells[y * self.width + x] = ink;
    }

    pub fn rows(&self) -> std::slice::Chunks<'_, bool> {
        self.cells.chunks(self.width.max(1))
    }

    pub fn count_foreground(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Reshapes the mask in place, keeping the allocation when possible.
    /// Contents are unspecified afterwards.
    pub(crate) fn reshape(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells.resize(width * height, false);
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [bool] {
        &mut self.cells
    }
}

//! Error types for binarization, tiling and frame stream I/O.

use ink_core::PixelRect;

/// Errors raised by the factory library.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// The declared grid size does not match the buffer, or a side is zero.
    #[error("invalid dimensions: {width}x{height} for a buffer of {len} cells")]
    InvalidDimensions {
        width: usize,
        height: usize,
        len: usize,
    },

    /// A rectangle field does not fit in the 16-bit wire format.
    #[error("coordinate overflow: rect ({x}, {y}, {w}, {h}) exceeds {max}", max = u16::MAX)]
    CoordinateOverflow {
        x: usize,
        y: usize,
        w: usize,
        h: usize,
    },

    /// A rectangle with zero width or height would read back as a sentinel.
    #[error("empty rect at ({x}, {y}): width and height must be at least 1")]
    EmptyRect { x: usize, y: usize },

    /// The underlying byte sink or source failed.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended in the middle of a record.
    #[error("truncated record: {0} trailing bytes")]
    TruncatedRecord(usize),

    /// A record is neither a rectangle nor the frame sentinel.
    #[error("malformed record #{index}: {record:?}")]
    MalformedRecord { index: u64, record: PixelRect },

    /// Rectangles were read after the last sentinel.
    #[error("unterminated frame: {0} rectangles without a trailing sentinel")]
    UnterminatedFrame(usize),

    /// Structured (JSON) export or import failed.
    #[error("export error: {0}")]
    Export(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FactoryError>;

pub mod binarizer;
pub mod converter;
pub mod error;
pub mod inspector;
pub mod stream;
pub mod tiler;

pub use error::FactoryError;
pub use ink_core::{PixelRect, DEFAULT_MAX_WIDTH, DEFAULT_THRESHOLD, RECORD_SIZE};

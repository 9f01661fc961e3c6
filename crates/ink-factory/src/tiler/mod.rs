pub mod core;
pub mod types;

pub use self::core::*;
pub use types::*;

pub mod core;
pub mod export;
pub mod reader;
pub mod types;

pub use self::core::*;
pub use export::*;
pub use reader::*;
pub use types::*;

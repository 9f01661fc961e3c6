pub mod async_handler;
pub mod cli;
pub mod core;
pub mod types;
pub mod utils;

// Re-export for easier access
pub use async_handler::*;
pub use cli::*;
pub use self::core::*;
pub use types::*;
pub use utils::*;

// Public modules
pub mod config;
pub mod error;
pub mod git;
pub mod index;
pub mod theme;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};

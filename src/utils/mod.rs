//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Command execution with error handling
//! - `io` - File I/O with consistent error handling
//! - `template` - `$TOKEN` placeholder substitution

pub mod command;
pub mod io;
pub mod template;

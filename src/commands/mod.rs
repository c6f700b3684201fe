//! Console commands module
//!
//! This module defines command types, parsing, completion and the static texts
//! the console prints.

pub mod command;
pub mod help;
pub mod parser;

// Re-export the main types for easier importing
pub use command::WasterCommand;
pub use help::{KNOWN_COMMANDS, complete_command, get_help_text};
pub use parser::{parse_command, parse_size};

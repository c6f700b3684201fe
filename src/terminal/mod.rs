//! Terminal module for the data waster
//!
//! This module handles screen drawing, key input and display formatting.

pub mod progress;
pub mod render;
pub mod session;

// Re-export commonly used items
pub use session::{Terminal, TerminalHost};

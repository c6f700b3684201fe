//! Console module
//!
//! The interpreter, its log and command history, and the texts it prints.

pub mod history;
pub mod interpreter;
pub mod log;
pub mod reports;

// Re-export main types
pub use history::CommandHistory;
pub use interpreter::{ConsoleEvent, ConsoleHooks, Interpreter};
pub use log::{ConsoleLog, LogEntry, LogKind};

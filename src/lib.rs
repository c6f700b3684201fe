//! Data waster: a fake-hacker console that burns bandwidth on purpose.

pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod host;
pub mod source;
pub mod terminal;
pub mod transfer;

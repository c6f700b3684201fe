//! Byte sources
//!
//! Pluggable remote backends the transfer engine and the network probes read from.

pub mod http;
pub mod traits;

// Re-export main types
pub use http::HttpByteSource;
pub use traits::{ByteSource, ChunkStream, cache_token};

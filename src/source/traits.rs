//! The byte source contract shared by the engine and the probes

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::Result;

/// Stream of chunks delivered by one bulk-download operation.
/// Dropping the stream cancels the operation.
pub type ChunkStream = BoxStream<'static, Result<Bytes>>;

#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Open one bulk-download operation. `cache_token` must end up in the
    /// request so repeated opens are never served from a cache.
    async fn open(&self, cache_token: u64) -> Result<ChunkStream>;

    /// Perform one tiny round-trip and wait for it to finish.
    async fn probe(&self) -> Result<()>;
}

/// Cache-busting token: the current unix time in milliseconds
pub fn cache_token() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

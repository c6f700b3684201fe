//! HTTP(S) byte source backed by reqwest

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use log::{debug, info, warn};
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, RequestBuilder};

use super::traits::{ByteSource, ChunkStream, cache_token};
use crate::config::EndpointConfig;
use crate::error::{Result, WasterError};

pub struct HttpByteSource {
    client: Client,
    download_url: String,
    download_bytes: u64,
    ping_url: String,
}

impl HttpByteSource {
    /// Create a source for the configured endpoints
    pub fn new(endpoints: &EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(endpoints.connect_timeout())
            .read_timeout(endpoints.read_timeout())
            .build()?;

        info!(
            "http byte source download={} bytes={} ping={}",
            endpoints.download_url, endpoints.download_bytes, endpoints.ping_url
        );

        Ok(Self::with_client(client, endpoints))
    }

    /// Create a source reusing an existing client
    pub fn with_client(client: Client, endpoints: &EndpointConfig) -> Self {
        Self {
            client,
            download_url: endpoints.download_url.clone(),
            download_bytes: endpoints.download_bytes,
            ping_url: endpoints.ping_url.clone(),
        }
    }

    /// The underlying client, shared with other lookups
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn build_download_request(&self, cache_token: u64) -> RequestBuilder {
        self.client
            .get(&self.download_url)
            .query(&[
                ("bytes", self.download_bytes.to_string()),
                ("t", cache_token.to_string()),
            ])
            .header(CACHE_CONTROL, "no-store")
    }
}

#[async_trait]
impl ByteSource for HttpByteSource {
    async fn open(&self, cache_token: u64) -> Result<ChunkStream> {
        let resp = self.build_download_request(cache_token).send().await?;

        let status = resp.status();
        debug!("http open status={} t={}", status.as_u16(), cache_token);
        if !status.is_success() {
            warn!("http open failed status={}", status.as_u16());
            return Err(WasterError::ConnectionLost(format!(
                "download failed: HTTP {}",
                status.as_u16()
            )));
        }

        Ok(resp.bytes_stream().map_err(WasterError::from).boxed())
    }

    async fn probe(&self) -> Result<()> {
        let resp = self
            .client
            .get(&self.ping_url)
            .query(&[("t", cache_token().to_string())])
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!("http probe failed status={}", status.as_u16());
            return Err(WasterError::ConnectionLost(format!(
                "probe failed: HTTP {}",
                status.as_u16()
            )));
        }

        // Drain the body so the round-trip is complete
        let body = resp.bytes().await?;
        debug!("http probe status={} body={} bytes", status.as_u16(), body.len());
        Ok(())
    }
}

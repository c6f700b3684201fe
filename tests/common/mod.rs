#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};

use data_waster::config::{ConsoleConfig, TransferConfig, WasterConfig};
use data_waster::error::{Result, WasterError};
use data_waster::host::{ReloadTrigger, Theme, ThemeSetter};
use data_waster::source::{ByteSource, ChunkStream};

/// What one `open()` call produces
#[derive(Debug, Clone)]
pub enum Script {
    /// Deliver these chunk sizes, then end the stream
    Chunks(Vec<usize>),
    /// Fail to open
    Fail,
    /// Deliver these chunk sizes, then fail mid-stream
    FailAfter(Vec<usize>),
    /// Deliver `chunk` bytes every `delay`, forever
    Endless { chunk: usize, delay: Duration },
    /// Open, then never deliver anything
    Hang,
}

/// Byte source that replays scripted opens. Once the queue is empty every
/// further open uses `fallback`.
pub struct ScriptedSource {
    scripts: Mutex<VecDeque<Script>>,
    fallback: Script,
    probe_fails: bool,
    opens: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            fallback: Script::Hang,
            probe_fails: false,
            opens: AtomicUsize::new(0),
        }
    }

    pub fn repeating(script: Script) -> Self {
        Self {
            fallback: script,
            ..Self::new(Vec::new())
        }
    }

    pub fn offline() -> Self {
        Self {
            fallback: Script::Fail,
            probe_fails: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ByteSource for ScriptedSource {
    async fn open(&self, _cache_token: u64) -> Result<ChunkStream> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match script {
            Script::Chunks(sizes) => Ok(stream::iter(
                sizes.into_iter().map(|n| Ok(Bytes::from(vec![0u8; n]))),
            )
            .boxed()),
            Script::Fail => Err(WasterError::ConnectionLost("scripted failure".to_string())),
            Script::FailAfter(sizes) => Ok(stream::iter(
                sizes
                    .into_iter()
                    .map(|n| Ok(Bytes::from(vec![0u8; n])))
                    .chain(std::iter::once(Err(WasterError::ConnectionLost(
                        "scripted reset".to_string(),
                    )))),
            )
            .boxed()),
            Script::Endless { chunk, delay } => Ok(stream::unfold((), move |_| async move {
                tokio::time::sleep(delay).await;
                Some((Ok(Bytes::from(vec![0u8; chunk])), ()))
            })
            .boxed()),
            Script::Hang => Ok(stream::pending().boxed()),
        }
    }

    async fn probe(&self) -> Result<()> {
        if self.probe_fails {
            return Err(WasterError::ConnectionLost("scripted failure".to_string()));
        }
        Ok(())
    }
}

/// Theme and reload collaborator that records every call
#[derive(Default)]
pub struct RecordingHost {
    pub themes: Mutex<Vec<Theme>>,
    pub reloads: AtomicUsize,
}

impl ThemeSetter for RecordingHost {
    fn set_theme(&self, theme: Theme) {
        self.themes.lock().unwrap().push(theme);
    }
}

impl ReloadTrigger for RecordingHost {
    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}

/// Fast timings so tests finish quickly
pub fn fast_transfer() -> TransferConfig {
    TransferConfig {
        sample_interval_ms: 10,
        retry_backoff_ms: 10,
    }
}

pub fn fast_config() -> WasterConfig {
    WasterConfig {
        transfer: fast_transfer(),
        console: ConsoleConfig {
            speedtest_duration_secs: 1,
            reboot_delay_ms: 10,
        },
        ..WasterConfig::default()
    }
}

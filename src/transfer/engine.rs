//! Continuous-download engine
//!
//! One job at a time: keeps opening bulk streams against the byte source until
//! the target byte count is reached or the job is stopped.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

use super::progress::RateSampler;
use super::state::{JobOutcome, JobState, average_speed};
use crate::config::TransferConfig;
use crate::error::{Result, WasterError};
use crate::source::{ByteSource, cache_token};

pub struct TransferEngine {
    source: Arc<dyn ByteSource>,
    config: TransferConfig,
    state: Arc<watch::Sender<JobState>>,
    outcomes: mpsc::UnboundedSender<JobOutcome>,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl TransferEngine {
    /// Create an idle engine. The receiver yields one outcome per finished job.
    pub fn new(
        source: Arc<dyn ByteSource>,
        config: TransferConfig,
    ) -> (Self, mpsc::UnboundedReceiver<JobOutcome>) {
        let (state, _) = watch::channel(JobState::default());
        let (outcomes, outcome_rx) = mpsc::unbounded_channel();

        let engine = Self {
            source,
            config,
            state: Arc::new(state),
            outcomes,
            cancel: None,
            task: None,
        };
        (engine, outcome_rx)
    }

    /// Start a new job. Rejected without touching the current state when a
    /// job is already running.
    pub fn start(&mut self, target_bytes: u64) -> Result<()> {
        if target_bytes == 0 {
            return Err(WasterError::InvalidTarget(target_bytes));
        }

        let running = self.state.borrow().is_running;
        if running {
            debug!("start({}) ignored: a job is already running", target_bytes);
            return Err(WasterError::JobAlreadyRunning);
        }

        let cancel = CancellationToken::new();
        let started = Instant::now();
        self.state.send_replace(JobState::started(target_bytes));

        let job = JobRun {
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
            outcomes: self.outcomes.clone(),
            cancel: cancel.clone(),
            target_bytes,
            started,
            sampler: RateSampler::new(self.config.sample_interval(), started),
            total_bytes: 0,
            retry_backoff: self.config.retry_backoff(),
        };

        info!("Starting job: target {} bytes", target_bytes);
        self.cancel = Some(cancel);
        self.task = Some(tokio::spawn(job.run()));
        Ok(())
    }

    /// Cancel the running job, keeping its last snapshot readable.
    /// Returns whether a job was actually stopped.
    pub fn stop(&mut self) -> bool {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }

        let mut stopped = None;
        self.state.send_if_modified(|state| {
            if !state.is_running {
                return false;
            }
            state.is_running = false;
            stopped = Some(state.clone());
            true
        });

        match stopped {
            Some(last) => {
                info!(
                    "Job cancelled after {} of {} bytes",
                    last.bytes_transferred, last.target_bytes
                );
                let _ = self.outcomes.send(JobOutcome::Cancelled {
                    bytes_transferred: last.bytes_transferred,
                    elapsed_secs: last.elapsed_secs,
                });
                true
            }
            None => false,
        }
    }

    /// Snapshot of the current (or last) job
    pub fn state(&self) -> JobState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().is_running
    }

    /// The byte source jobs read from
    pub fn source(&self) -> Arc<dyn ByteSource> {
        Arc::clone(&self.source)
    }
}

impl Drop for TransferEngine {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Result of one bulk-download operation
enum Pass {
    Completed,
    Exhausted,
    Cancelled,
}

/// State owned by the loop task of a single job
struct JobRun {
    source: Arc<dyn ByteSource>,
    state: Arc<watch::Sender<JobState>>,
    outcomes: mpsc::UnboundedSender<JobOutcome>,
    cancel: CancellationToken,
    target_bytes: u64,
    started: Instant,
    sampler: RateSampler,
    total_bytes: u64,
    retry_backoff: Duration,
}

impl JobRun {
    async fn run(mut self) {
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;

            match self.transfer_once().await {
                Ok(Pass::Completed) => return,
                Ok(Pass::Cancelled) => {
                    debug!("transfer {} cancelled at {} bytes", attempt, self.total_bytes);
                    return;
                }
                Ok(Pass::Exhausted) => {
                    debug!(
                        "transfer {} ended at {}/{} bytes, reopening",
                        attempt, self.total_bytes, self.target_bytes
                    );
                }
                Err(e) => {
                    if e.is_transient() {
                        debug!("transfer {} interrupted: {}", attempt, e);
                    } else {
                        warn!("transfer {} failed: {}", attempt, e);
                    }
                    debug!("retrying in {:?}", self.retry_backoff);
                    if self.backoff().await {
                        return;
                    }
                }
            }

            if self.cancel.is_cancelled() {
                return;
            }
        }
    }

    /// Wait out the retry backoff. Returns true when cancelled meanwhile.
    async fn backoff(&self) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => true,
            _ = sleep(self.retry_backoff) => false,
        }
    }

    async fn transfer_once(&mut self) -> Result<Pass> {
        let source = Arc::clone(&self.source);
        let mut stream = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(Pass::Cancelled),
            opened = source.open(cache_token()) => opened?,
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(Pass::Cancelled),
                next = stream.next() => next,
            };

            let Some(chunk) = next else {
                return Ok(Pass::Exhausted);
            };
            self.total_bytes += chunk?.len() as u64;

            if self.total_bytes >= self.target_bytes {
                // Dropping the stream on return aborts the in-flight request
                self.complete();
                return Ok(Pass::Completed);
            }

            let now = Instant::now();
            if let Some(speed) = self.sampler.sample(now, self.total_bytes) {
                let total = self.total_bytes;
                let elapsed_secs = now.duration_since(self.started).as_secs_f64();
                self.publish(|state| {
                    state.bytes_transferred = total;
                    state.speed_bytes_per_sec = speed;
                    state.elapsed_secs = elapsed_secs;
                });
            }
        }
    }

    fn complete(&self) {
        let elapsed_secs = self.started.elapsed().as_secs_f64();
        let average = average_speed(self.total_bytes, elapsed_secs);
        let final_state = JobState {
            is_running: false,
            bytes_transferred: self.total_bytes,
            target_bytes: self.target_bytes,
            speed_bytes_per_sec: average,
            elapsed_secs,
        };

        if self.publish(|state| *state = final_state) {
            info!(
                "Job completed: {} bytes in {:.1}s",
                self.total_bytes, elapsed_secs
            );
            let _ = self.outcomes.send(JobOutcome::Completed {
                total_bytes: self.total_bytes,
                target_bytes: self.target_bytes,
                elapsed_secs,
                average_speed: average,
            });
        }
        self.cancel.cancel();
    }

    /// Publish a snapshot unless the job has been stopped. The check runs
    /// under the channel's write lock, so nothing lands after `stop()`.
    fn publish(&self, update: impl FnOnce(&mut JobState)) -> bool {
        let cancel = &self.cancel;
        self.state.send_if_modified(|state| {
            if cancel.is_cancelled() {
                return false;
            }
            update(state);
            true
        })
    }
}

//! Job state snapshots and terminal outcomes

/// Snapshot of the current (or last) job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobState {
    pub is_running: bool,
    pub bytes_transferred: u64,
    pub target_bytes: u64,
    pub speed_bytes_per_sec: f64,
    pub elapsed_secs: f64,
}

impl JobState {
    /// Fresh state for a job that is about to start
    pub fn started(target_bytes: u64) -> Self {
        Self {
            is_running: true,
            bytes_transferred: 0,
            target_bytes,
            speed_bytes_per_sec: 0.0,
            elapsed_secs: 0.0,
        }
    }

    /// Progress toward the target, capped at 100
    pub fn percentage(&self) -> f64 {
        if self.target_bytes == 0 {
            0.0
        } else {
            (self.bytes_transferred as f64 / self.target_bytes as f64 * 100.0).min(100.0)
        }
    }
}

/// How a job ended. Emitted by the engine exactly once per job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed {
        total_bytes: u64,
        target_bytes: u64,
        elapsed_secs: f64,
        average_speed: f64,
    },
    Cancelled {
        bytes_transferred: u64,
        elapsed_secs: f64,
    },
}

/// Average speed over a whole job. Jobs shorter than a second count as one second.
pub fn average_speed(total_bytes: u64, elapsed_secs: f64) -> f64 {
    total_bytes as f64 / elapsed_secs.max(1.0)
}

//! Transfer engine and network probes

pub mod engine;
pub mod probe;
pub mod progress;
pub mod state;

// Re-export main types
pub use engine::TransferEngine;
pub use probe::{LinkQuality, SpeedReport, measure_bandwidth, ping};
pub use progress::RateSampler;
pub use state::{JobOutcome, JobState, average_speed};

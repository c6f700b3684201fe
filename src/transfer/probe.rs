//! Latency and bandwidth probes used by `ping` and `speedtest`

use std::fmt;
use std::time::Duration;

use futures::StreamExt;
use log::{debug, error};
use tokio::time::{Instant, sleep};

use crate::error::Result;
use crate::source::{ByteSource, cache_token};

/// Latency classification shown next to a ping result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl LinkQuality {
    pub fn from_latency(latency: Duration) -> Self {
        match latency.as_millis() {
            0..=100 => Self::Excellent,
            101..=200 => Self::Good,
            201..=500 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

impl fmt::Display for LinkQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excellent => write!(f, "EXCELLENT"),
            Self::Good => write!(f, "GOOD"),
            Self::Fair => write!(f, "FAIR"),
            Self::Poor => write!(f, "POOR"),
        }
    }
}

/// Result of a full speed test
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedReport {
    pub ping: Duration,
    pub bytes: u64,
    pub elapsed: Duration,
}

impl SpeedReport {
    /// Throughput over the bandwidth window
    pub fn speed_bytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs
        } else {
            0.0
        }
    }
}

/// Time one tiny round-trip
pub async fn ping(source: &dyn ByteSource) -> Result<Duration> {
    let start = Instant::now();
    source.probe().await?;
    let latency = start.elapsed();
    debug!("ping round-trip {:?}", latency);
    Ok(latency)
}

/// Download for at most `window` and report how much arrived.
/// Failures end the measurement early; they are logged and never returned.
pub async fn measure_bandwidth(source: &dyn ByteSource, window: Duration) -> (u64, Duration) {
    let started = Instant::now();
    let deadline = sleep(window);
    tokio::pin!(deadline);

    let mut bytes = 0u64;
    let result: Result<()> = async {
        let mut stream = tokio::select! {
            biased;
            _ = &mut deadline => return Ok(()),
            opened = source.open(cache_token()) => opened?,
        };

        loop {
            tokio::select! {
                biased;
                _ = &mut deadline => return Ok(()),
                next = stream.next() => match next {
                    Some(chunk) => bytes += chunk?.len() as u64,
                    None => return Ok(()),
                },
            }
        }
    }
    .await;

    if let Err(e) = result {
        error!("bandwidth measurement failed after {} bytes: {}", bytes, e);
    }

    (bytes, started.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_quality_thresholds() {
        let ms = Duration::from_millis;
        assert_eq!(LinkQuality::from_latency(ms(0)), LinkQuality::Excellent);
        assert_eq!(LinkQuality::from_latency(ms(100)), LinkQuality::Excellent);
        assert_eq!(LinkQuality::from_latency(ms(101)), LinkQuality::Good);
        assert_eq!(LinkQuality::from_latency(ms(200)), LinkQuality::Good);
        assert_eq!(LinkQuality::from_latency(ms(500)), LinkQuality::Fair);
        assert_eq!(LinkQuality::from_latency(ms(501)), LinkQuality::Poor);
        assert_eq!(LinkQuality::Poor.to_string(), "POOR");
    }

    #[test]
    fn test_report_speed() {
        let report = SpeedReport {
            ping: Duration::from_millis(20),
            bytes: 5_000_000,
            elapsed: Duration::from_secs(10),
        };
        assert_eq!(report.speed_bytes_per_sec(), 500_000.0);

        let empty = SpeedReport {
            ping: Duration::ZERO,
            bytes: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(empty.speed_bytes_per_sec(), 0.0);
    }
}

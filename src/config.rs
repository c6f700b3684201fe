use crate::error::{Result, WasterError};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Default location of the optional config file
pub const DEFAULT_CONFIG_PATH: &str = "data-waster.toml";

/// Environment variable that points at a different config file
pub const CONFIG_PATH_VAR: &str = "DATA_WASTER_CONFIG";

/// Prefix for `DATA_WASTER__<SECTION>__<KEY>` overrides
const ENV_PREFIX: &str = "DATA_WASTER";

/// Configuration for the data waster
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WasterConfig {
    /// Remote endpoints
    pub endpoints: EndpointConfig,

    /// Transfer engine tuning
    pub transfer: TransferConfig,

    /// Console timing
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Bulk download source, queried with `bytes` and a cache-busting `t`
    pub download_url: String,

    /// Bytes requested per bulk download
    pub download_bytes: u64,

    /// Tiny payload endpoint used for latency checks
    pub ping_url: String,

    /// IP lookup service for the device info header
    pub ip_lookup_url: String,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Longest wait for the next read before a stalled transfer fails
    pub read_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Minimum gap between two rate samples
    pub sample_interval_ms: u64,

    /// Wait before retrying a failed transfer
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Length of the bandwidth phase of the speed test
    pub speedtest_duration_secs: u64,

    /// Delay between the reboot message and the actual reload
    pub reboot_delay_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            download_url: "https://speed.cloudflare.com/__down".to_string(),
            download_bytes: 50_000_000,
            ping_url: "https://speed.cloudflare.com/__down?bytes=1".to_string(),
            ip_lookup_url: "https://ipinfo.io/json".to_string(),
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 200,
            retry_backoff_ms: 1000,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            speedtest_duration_secs: 10,
            reboot_delay_ms: 800,
        }
    }
}

impl TransferConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl ConsoleConfig {
    pub fn speedtest_window(&self) -> Duration {
        Duration::from_secs(self.speedtest_duration_secs)
    }

    pub fn reboot_delay(&self) -> Duration {
        Duration::from_millis(self.reboot_delay_ms)
    }
}

impl EndpointConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

impl WasterConfig {
    /// Load defaults, the optional config file and environment overrides
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_config_file(&path)
    }

    /// Create configuration from a TOML file with environment variable overrides.
    /// A missing file is not an error; defaults fill every key it leaves out.
    pub fn from_config_file(config_path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::new(config_path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                WasterError::ConfigFile(format!("Cannot load config '{}': {}", config_path, e))
            })?;

        let config: WasterConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text, without environment overrides
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;

        let config: WasterConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the basic configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.download_url.trim().is_empty() {
            return Err(WasterError::InvalidConfigValue(
                "Download URL cannot be empty".to_string(),
            ));
        }

        if self.endpoints.ping_url.trim().is_empty() {
            return Err(WasterError::InvalidConfigValue(
                "Ping URL cannot be empty".to_string(),
            ));
        }

        if self.endpoints.download_bytes == 0 {
            return Err(WasterError::InvalidConfigValue(
                "Download size cannot be 0".to_string(),
            ));
        }

        if self.endpoints.connect_timeout_secs == 0 {
            return Err(WasterError::InvalidConfigValue(
                "Connect timeout cannot be 0".to_string(),
            ));
        }

        if self.endpoints.read_timeout_secs == 0 {
            return Err(WasterError::InvalidConfigValue(
                "Read timeout cannot be 0".to_string(),
            ));
        }

        if self.transfer.sample_interval_ms == 0 {
            return Err(WasterError::InvalidConfigValue(
                "Sample interval cannot be 0".to_string(),
            ));
        }

        if self.console.speedtest_duration_secs == 0 {
            return Err(WasterError::InvalidConfigValue(
                "Speed test duration cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl std::fmt::Display for WasterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Data Waster Config - Source: {} ({} bytes/request), Ping: {}, Sample: {}ms, Backoff: {}ms, Speed Test: {}s",
            self.endpoints.download_url,
            self.endpoints.download_bytes,
            self.endpoints.ping_url,
            self.transfer.sample_interval_ms,
            self.transfer.retry_backoff_ms,
            self.console.speedtest_duration_secs
        )
    }
}

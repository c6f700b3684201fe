use std::fmt;

/// Main error type for the data waster
#[derive(Debug)]
pub enum WasterError {
    // Validation Errors
    InvalidTarget(u64),
    JobAlreadyRunning,

    // Network Errors
    Network(reqwest::Error),
    ConnectionLost(String),

    // Configuration Errors
    InvalidConfigValue(String),
    ConfigFile(String),

    // IO Errors
    Io(std::io::Error),
}

impl fmt::Display for WasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Validation Errors
            Self::InvalidTarget(bytes) => {
                write!(f, "Invalid target: {} bytes (must be greater than 0)", bytes)
            }
            Self::JobAlreadyRunning => write!(f, "A job is already running"),

            // Network Errors
            Self::Network(err) => write!(f, "Network error: {}", err),
            Self::ConnectionLost(msg) => write!(f, "Connection lost: {}", msg),

            // Configuration Errors
            Self::InvalidConfigValue(msg) => write!(f, "Invalid config value: {}", msg),
            Self::ConfigFile(msg) => write!(f, "Config file error: {}", msg),

            // IO Errors
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for WasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Network(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WasterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<reqwest::Error> for WasterError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err)
    }
}

impl From<config::ConfigError> for WasterError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigFile(err.to_string())
    }
}

impl WasterError {
    /// Whether this error comes from the remote side rather than from user input
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::ConnectionLost(_) | Self::Io(_))
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, WasterError>;

//! Host collaborators the console drives but does not implement

pub mod device;

use std::fmt;

// Re-export main types
pub use device::{DeviceInfo, DeviceInfoProvider, SharedDeviceInfo, spawn_collector};

/// Interface theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Applies a theme to whatever renders the console
pub trait ThemeSetter: Send + Sync {
    fn set_theme(&self, theme: Theme);
}

/// Restarts the application session
pub trait ReloadTrigger: Send + Sync {
    fn reload(&self);
}

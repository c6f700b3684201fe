//! Console command definitions

use crate::host::Theme;

/// Commands understood by the console
#[derive(Debug, Clone, PartialEq)]
pub enum WasterCommand {
    /// START - Begin wasting the given amount (raw size argument)
    Start(String),

    /// STOP - Abort the running job
    Stop,

    /// PING - Measure round-trip latency
    Ping,

    /// SPEEDTEST / FAST / TEST - Latency plus a timed bandwidth window
    SpeedTest,

    /// SYS / INFO / SPECS / NEOFETCH - Device and network diagnostics
    SysInfo,

    /// TIME / DATE - Local and UTC clocks
    Time,

    /// WHOAMI
    WhoAmI,

    /// LS / LL / DIR - Fake directory listing
    List,

    /// MATRIX
    Matrix,

    /// ECHO - Print text back
    Echo(String),

    /// HISTORY - Previously submitted commands
    History,

    /// HELP / ? - Show available commands
    Help,

    /// CLEAR / CLS - Empty the console
    Clear,

    /// LIGHT / DARK - Switch theme
    Theme(Theme),

    /// REBOOT / RELOAD - Restart the session
    Reboot,

    /// Unknown or unsupported command token
    Unknown(String),
}

impl std::fmt::Display for WasterCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WasterCommand::Start(size) => write!(f, "START {size}"),
            WasterCommand::Stop => write!(f, "STOP"),
            WasterCommand::Ping => write!(f, "PING"),
            WasterCommand::SpeedTest => write!(f, "SPEEDTEST"),
            WasterCommand::SysInfo => write!(f, "SYS"),
            WasterCommand::Time => write!(f, "TIME"),
            WasterCommand::WhoAmI => write!(f, "WHOAMI"),
            WasterCommand::List => write!(f, "LS"),
            WasterCommand::Matrix => write!(f, "MATRIX"),
            WasterCommand::Echo(text) => write!(f, "ECHO {text}"),
            WasterCommand::History => write!(f, "HISTORY"),
            WasterCommand::Help => write!(f, "HELP"),
            WasterCommand::Clear => write!(f, "CLEAR"),
            WasterCommand::Theme(theme) => write!(f, "{}", theme.to_string().to_uppercase()),
            WasterCommand::Reboot => write!(f, "REBOOT"),
            WasterCommand::Unknown(cmd) => write!(f, "UNKNOWN({cmd})"),
        }
    }
}

//! Command and size argument parsing

use regex::Regex;
use std::sync::LazyLock;

use super::WasterCommand;
use crate::host::Theme;

/// Number immediately followed by a binary unit, e.g. `1.5gb`
static SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)(kb|mb|gb)$").expect("valid size pattern"));

/// Parse user input into a WasterCommand. The command token is
/// case-insensitive; everything after it is the argument.
pub fn parse_command(input: &str) -> WasterCommand {
    let trimmed = input.trim();

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_lowercase();
    let arg = parts.next().unwrap_or("").trim();

    match cmd.as_str() {
        "start" => WasterCommand::Start(arg.to_string()),
        "stop" => WasterCommand::Stop,
        "ping" => WasterCommand::Ping,
        "speedtest" | "fast" | "test" => WasterCommand::SpeedTest,
        "sys" | "info" | "specs" | "neofetch" => WasterCommand::SysInfo,
        "time" | "date" => WasterCommand::Time,
        "whoami" => WasterCommand::WhoAmI,
        "ls" | "ll" | "dir" => WasterCommand::List,
        "matrix" => WasterCommand::Matrix,
        "echo" => WasterCommand::Echo(arg.split_whitespace().collect::<Vec<_>>().join(" ")),
        "history" => WasterCommand::History,
        "help" | "?" => WasterCommand::Help,
        "clear" | "cls" => WasterCommand::Clear,
        "light" => WasterCommand::Theme(Theme::Light),
        "dark" => WasterCommand::Theme(Theme::Dark),
        "reboot" | "reload" => WasterCommand::Reboot,
        _ => WasterCommand::Unknown(cmd),
    }
}

/// Parse a size such as `500mb` or `10 GB` into bytes (1024-based units).
/// Returns `None` for anything else, including sizes below one byte.
pub fn parse_size(input: &str) -> Option<u64> {
    let clean: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    let caps = SIZE_PATTERN.captures(&clean)?;
    let value: f64 = caps[1].parse().ok()?;
    let multiplier: u64 = match &caps[2] {
        "kb" => 1024,
        "mb" => 1024 * 1024,
        "gb" => 1024 * 1024 * 1024,
        _ => return None,
    };

    // `as u64` saturates, so anything at or past the top of the range is rejected
    let product = value * multiplier as f64;
    if !product.is_finite() || product >= u64::MAX as f64 {
        return None;
    }

    let bytes = product as u64;
    (bytes > 0).then_some(bytes)
}

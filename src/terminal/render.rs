//! Frame composition
//!
//! Builds the lines of one screen from the console state. Drawing them is
//! left to the session so this stays free of terminal I/O.

use crossterm::style::Color;

use super::progress::{format_bit_rate, format_bytes, progress_bar};
use crate::console::{LogEntry, LogKind};
use crate::host::{DeviceInfo, Theme};
use crate::transfer::JobState;

/// One colored screen line
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub color: Color,
    pub text: String,
}

impl Line {
    fn new(color: Color, text: impl Into<String>) -> Self {
        Self {
            color,
            text: text.into(),
        }
    }
}

/// Everything a frame is built from
pub struct View<'a> {
    pub theme: Theme,
    /// `None` once the header has been cleared away
    pub device: Option<&'a DeviceInfo>,
    pub entries: &'a [LogEntry],
    pub job: &'a JobState,
    pub input: &'a str,
}

struct Palette {
    text: Color,
    info: Color,
    error: Color,
    success: Color,
    accent: Color,
    muted: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                text: Color::Grey,
                info: Color::Yellow,
                error: Color::Red,
                success: Color::Green,
                accent: Color::Blue,
                muted: Color::DarkGrey,
            },
            Theme::Light => Self {
                text: Color::White,
                info: Color::DarkYellow,
                error: Color::DarkRed,
                success: Color::DarkGreen,
                accent: Color::Cyan,
                muted: Color::Grey,
            },
        }
    }

    fn for_kind(&self, kind: LogKind) -> Color {
        match kind {
            LogKind::Info => self.info,
            LogKind::Error => self.error,
            LogKind::Success => self.success,
            LogKind::System => self.text,
        }
    }
}

/// Compose the full frame, top to bottom
pub fn compose(view: &View<'_>) -> Vec<Line> {
    let palette = Palette::for_theme(view.theme);
    let mut lines = Vec::new();

    if let Some(device) = view.device {
        header_lines(device, &palette, &mut lines);
    }

    for entry in view.entries {
        let color = palette.for_kind(entry.kind);
        lines.extend(entry.message.lines().map(|text| Line::new(color, text)));
    }

    if view.job.is_running {
        job_panel(view.job, &palette, &mut lines);
    }

    lines.push(Line::new(palette.accent, "┌──(sensei㉿waster)-[~]"));
    lines.push(Line::new(palette.success, format!("└─$ {}_", view.input)));
    lines
}

fn header_lines(device: &DeviceInfo, palette: &Palette, lines: &mut Vec<Line>) {
    let power = if device.is_charging == "YES" {
        "[CHR]"
    } else {
        "[DIS]"
    };

    lines.push(Line::new(palette.success, "DATA_WASTER :: SENSEI TERMINAL"));
    lines.push(Line::new(
        palette.info,
        format!(
            "IP: {}  ISP: {}  LOC: {}, {}  TZ: {}",
            device.ip, device.isp, device.city, device.country, device.timezone
        ),
    ));
    lines.push(Line::new(
        palette.muted,
        format!(
            "OS: {}  CPU: {} LOGICAL  NET: {} ({})  BAT: {} {}",
            device.os,
            device.cores,
            device.connection_type,
            device.downlink,
            device.battery_level,
            power
        ),
    ));
    lines.push(Line::new(palette.muted, "-".repeat(48)));
}

fn job_panel(job: &JobState, palette: &Palette, lines: &mut Vec<Line>) {
    let percentage = job.percentage();
    lines.push(Line::new(palette.info, "[ TASK IN PROGRESS ]"));
    lines.push(Line::new(
        palette.text,
        format!(
            "SPD: {}    TME: {}s",
            format_bit_rate(job.speed_bytes_per_sec),
            job.elapsed_secs.floor()
        ),
    ));
    lines.push(Line::new(
        palette.text,
        format!(
            "{} / {}",
            format_bytes(job.bytes_transferred),
            format_bytes(job.target_bytes)
        ),
    ));
    lines.push(Line::new(
        palette.info,
        format!("{} {}%", progress_bar(percentage), percentage.floor()),
    ));
}

/// The last `rows` lines, which is what fits on screen
pub fn visible_tail(lines: &[Line], rows: usize) -> &[Line] {
    let start = lines.len().saturating_sub(rows);
    &lines[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn entry(kind: LogKind, message: &str) -> LogEntry {
        LogEntry {
            id: 0,
            kind,
            message: message.to_string(),
            timestamp: Local::now(),
        }
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_idle_frame_without_header() {
        let entries = vec![entry(LogKind::Info, "line one\nline two")];
        let job = JobState::default();
        let lines = compose(&View {
            theme: Theme::Dark,
            device: None,
            entries: &entries,
            job: &job,
            input: "sta",
        });

        assert_eq!(
            texts(&lines),
            vec![
                "line one",
                "line two",
                "┌──(sensei㉿waster)-[~]",
                "└─$ sta_"
            ]
        );
        assert_eq!(lines[0].color, Color::Yellow);
    }

    #[test]
    fn test_job_panel() {
        let job = JobState {
            is_running: true,
            bytes_transferred: 512 * 1024,
            target_bytes: 1024 * 1024,
            speed_bytes_per_sec: 125_000.0,
            elapsed_secs: 3.7,
        };
        let lines = compose(&View {
            theme: Theme::Light,
            device: None,
            entries: &[],
            job: &job,
            input: "",
        });
        let text = texts(&lines);

        assert!(text.contains(&"SPD: 1 Mbps    TME: 3s"));
        assert!(text.contains(&"512 KB / 1 MB"));
        assert!(text.contains(&"[##########..........] 50%"));
    }

    #[test]
    fn test_header_shows_device_info() {
        let device = DeviceInfo {
            ip: "203.0.113.7".to_string(),
            is_charging: "YES".to_string(),
            ..DeviceInfo::default()
        };
        let job = JobState::default();
        let lines = compose(&View {
            theme: Theme::Dark,
            device: Some(&device),
            entries: &[],
            job: &job,
            input: "",
        });

        assert!(lines[1].text.starts_with("IP: 203.0.113.7"));
        assert!(lines[2].text.ends_with("[CHR]"));
    }

    #[test]
    fn test_visible_tail() {
        let lines: Vec<Line> = (0..5)
            .map(|i| Line::new(Color::Grey, i.to_string()))
            .collect();
        assert_eq!(texts(visible_tail(&lines, 2)), vec!["3", "4"]);
        assert_eq!(visible_tail(&lines, 10).len(), 5);
    }
}

//! Human readable sizes, rates and the job progress bar

/// Cells in the job progress bar
const BAR_CELLS: usize = 20;

/// Format a value with up to `decimals` places, dropping trailing zeros
fn trim_decimals(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value);
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}

/// Format bytes with binary prefixes and two decimals
pub fn format_bytes(bytes: u64) -> String {
    format_bytes_with(bytes, 2)
}

/// Format bytes with binary prefixes
pub fn format_bytes_with(bytes: u64, decimals: usize) -> String {
    const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{} {}", trim_decimals(size, decimals), UNITS[unit_index])
}

/// Format a byte rate as a network bit rate (decimal prefixes)
pub fn format_bit_rate(bytes_per_sec: f64) -> String {
    const UNITS: &[&str] = &["bps", "Kbps", "Mbps", "Gbps"];
    let mut bits = bytes_per_sec * 8.0;
    if !bits.is_finite() || bits <= 0.0 {
        return "0 bps".to_string();
    }

    let mut unit_index = 0;
    while bits >= 1000.0 && unit_index < UNITS.len() - 1 {
        bits /= 1000.0;
        unit_index += 1;
    }

    format!("{} {}", trim_decimals(bits, 2), UNITS[unit_index])
}

/// Render a fixed-width progress bar such as `[#####...............]`
pub fn progress_bar(percentage: f64) -> String {
    let clamped = percentage.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * BAR_CELLS as f64).floor() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_CELLS - filled))
}

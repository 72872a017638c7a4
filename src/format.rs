use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const ABSENT: &str = "--";

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Formats a `/proc/meminfo` counter, which is in KiB.
pub fn format_kib(kib: u64) -> String {
    format_bytes(kib.saturating_mul(1024))
}

pub fn format_freq_khz(khz: Option<u64>) -> String {
    match khz {
        None | Some(0) => ABSENT.to_string(),
        Some(khz) if khz >= 2_000_000 => format!("{:.2} GHz", khz as f64 / 1_000_000.0),
        Some(khz) => format!("{} MHz", (khz as f64 / 1000.0).round() as u64),
    }
}

pub fn format_percent(value: f32) -> String {
    if value.is_finite() {
        format!("{value:.1}%")
    } else {
        ABSENT.to_string()
    }
}

pub fn or_absent(value: &str) -> &str {
    if value.trim().is_empty() { ABSENT } else { value }
}

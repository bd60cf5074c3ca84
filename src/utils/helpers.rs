/// Helper utilities for the Overseer CLI

use chrono::{DateTime, Local};

use crate::utils::BAR_SEGMENTS;

/// Build a usage bar of `BAR_SEGMENTS` cells with `fill` of them filled
pub fn render_bar(fill: u8) -> String {
    let fill = fill.min(BAR_SEGMENTS) as usize;
    let empty = BAR_SEGMENTS as usize - fill;
    format!("{}{}", "█".repeat(fill), "░".repeat(empty))
}

/// Format a wall-clock time for the dashboard title
pub fn format_clock(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format a wall-clock time for a table cell
pub fn format_time_of_day(time: &DateTime<Local>) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Truncate string with ellipsis (counts characters, not bytes)
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Split a comma/whitespace separated host list, dropping empty entries
pub fn parse_host_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}

/// Basic sanity check for a host address (IP or DNS name)
pub fn is_valid_host(host: &str) -> bool {
    !host.is_empty()
        && !host.starts_with('-')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':'))
}

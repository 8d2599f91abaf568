use chrono::{Local, TimeZone};

/// Render an epoch-millisecond timestamp in local time, or `never` when absent.
pub fn format_millis(millis: Option<i64>) -> String {
    let Some(ms) = millis else {
        return "never".to_string();
    };
    match Local.timestamp_millis_opt(ms).single() {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => ms.to_string(),
    }
}

pub fn format_kg(value: f64) -> String {
    format!("{value:.2}")
}

/// Truncate `input` to at most `max_chars` Unicode characters, stripping
/// control characters and appending `…` when truncated.
pub fn truncate_with_ellipsis(input: &str, max_chars: usize) -> String {
    let clean: String = input.chars().filter(|c| !c.is_control()).collect();
    if clean.chars().count() > max_chars {
        let mut s: String = clean.chars().take(max_chars).collect();
        s.push('…');
        s
    } else {
        clean
    }
}

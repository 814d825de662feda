/// `MM:SS` timer text; minutes keep growing past 99.
pub fn format_timer(total_seconds: i64) -> String {
    let seconds = total_seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Seconds below a minute, otherwise minutes with one decimal (`2.5 min`,
/// `3 min`).
pub fn format_minutes(total_seconds: u64) -> String {
    if total_seconds < 60 {
        return format!("{total_seconds} s");
    }
    let minutes = format!("{:.1}", total_seconds as f64 / 60.0);
    let minutes = minutes.strip_suffix(".0").unwrap_or(&minutes);
    format!("{minutes} min")
}

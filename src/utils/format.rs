/// Render a millisecond duration as "1h 02m 03s", "4m 05s" or "12s"
pub fn format_duration_ms(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

/// One decimal place, as every angle and percentage is shown
pub fn format_degrees(angle: f64) -> String {
    format!("{angle:.1}°")
}

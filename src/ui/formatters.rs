use chrono::{DateTime, Local};
use std::time::Duration;

use crate::core::monitor::events::TIME_FORMAT;

/// Format a duration as seconds with one decimal (e.g. "12.3s")
pub fn format_secs(duration: Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}

/// Format a duration in human-readable form (45s, 3m 05s, 2h 01m)
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    if total < 60 {
        format!("{}s", total)
    } else if total < 3600 {
        format!("{}m {:02}s", total / 60, total % 60)
    } else {
        format!("{}h {:02}m", total / 3600, (total % 3600) / 60)
    }
}

/// Format timestamp as YYYY-MM-DD HH:MM:SS
pub fn format_time(time: &DateTime<Local>) -> String {
    time.format(TIME_FORMAT).to_string()
}

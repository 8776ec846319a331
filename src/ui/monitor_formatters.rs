use colored::*;
use std::time::Duration;

use super::formatters::format_duration;
use crate::core::monitor::{DeviceSnapshot, EventLevel, LogEvent, MonitorEvent};

/// Print one monitoring event as a coloured log line
pub fn print_event(event: &LogEvent) {
    let line = event.to_string();
    let colored_line = match &event.event {
        MonitorEvent::Recovered { .. } | MonitorEvent::NotificationSent { .. } => line.green(),
        MonitorEvent::StillDown { .. } => line.yellow(),
        MonitorEvent::Unresponsive { .. } => line.red().bold(),
        _ => match event.event.level() {
            EventLevel::Info => line.normal(),
            EventLevel::Warning => line.yellow(),
            EventLevel::Error => line.red(),
        },
    };
    println!("{}", colored_line);
}

/// Status label for one device row
pub fn status_label(snapshot: &DeviceSnapshot, poll_interval: Duration) -> &'static str {
    if snapshot.notified {
        "ALERTED"
    } else if snapshot.unseen_secs > poll_interval.as_secs_f64() {
        "DOWN"
    } else {
        "UP"
    }
}

/// Print the current state of every device as a table
pub fn print_snapshot(snapshots: &[DeviceSnapshot], poll_interval: Duration) {
    println!(
        "\n{:<24} {:<20} {:<8} {}",
        "ADDRESS".bold(),
        "IDENTIFIER".bold(),
        "STATUS".bold(),
        "LAST SEEN".bold()
    );
    println!("{}", "-".repeat(70));

    for snapshot in snapshots {
        let status = status_label(snapshot, poll_interval);
        let status = match status {
            "UP" => status.green(),
            "DOWN" => status.yellow(),
            _ => status.red().bold(),
        };
        println!(
            "{:<24} {:<20} {:<8} {} ago",
            snapshot.address,
            snapshot.identifier,
            status,
            format_duration(Duration::from_secs_f64(snapshot.unseen_secs))
        );
    }
}

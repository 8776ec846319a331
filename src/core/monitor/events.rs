//! Monitoring events and the sinks that receive them.
//!
//! The monitor never prints; it hands timestamped events to an [`EventSink`].

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Timestamp format used for log lines and alert templates
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventLevel {
    Info,
    Warning,
    Error,
}

/// Something the monitor wants the outside world to know about
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MonitorEvent {
    Starting,
    Watching {
        devices: usize,
    },
    SettingsFallback {
        reason: String,
    },
    StillDown {
        address: String,
        identifier: String,
        downtime: Duration,
    },
    Unresponsive {
        address: String,
        identifier: String,
        downtime: Duration,
    },
    Recovered {
        address: String,
        identifier: String,
        downtime: Duration,
    },
    NotificationSent {
        address: String,
        identifier: String,
    },
    NotificationFailed {
        address: String,
        identifier: String,
        error: String,
    },
    ProbeFailed {
        address: String,
        error: String,
    },
    DeviceFault {
        address: String,
        error: String,
    },
    Stopped,
}

impl MonitorEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            MonitorEvent::Starting
            | MonitorEvent::Watching { .. }
            | MonitorEvent::StillDown { .. }
            | MonitorEvent::Recovered { .. }
            | MonitorEvent::NotificationSent { .. }
            | MonitorEvent::Stopped => EventLevel::Info,
            MonitorEvent::SettingsFallback { .. }
            | MonitorEvent::Unresponsive { .. }
            | MonitorEvent::ProbeFailed { .. } => EventLevel::Warning,
            MonitorEvent::NotificationFailed { .. } | MonitorEvent::DeviceFault { .. } => {
                EventLevel::Error
            }
        }
    }

    /// Address of the device the event is about, if any
    pub fn address(&self) -> Option<&str> {
        match self {
            MonitorEvent::StillDown { address, .. }
            | MonitorEvent::Unresponsive { address, .. }
            | MonitorEvent::Recovered { address, .. }
            | MonitorEvent::NotificationSent { address, .. }
            | MonitorEvent::NotificationFailed { address, .. }
            | MonitorEvent::ProbeFailed { address, .. }
            | MonitorEvent::DeviceFault { address, .. } => Some(address),
            _ => None,
        }
    }
}

impl fmt::Display for MonitorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorEvent::Starting => write!(f, "Starting device monitoring..."),
            MonitorEvent::Watching { devices } => write!(f, "Monitoring {} devices", devices),
            MonitorEvent::SettingsFallback { reason } => {
                write!(f, "Invalid configuration values - using defaults ({})", reason)
            }
            MonitorEvent::StillDown {
                address,
                identifier,
                downtime,
            } => write!(
                f,
                "Device {} ({}) not responding ({:.1}s)",
                address,
                identifier,
                downtime.as_secs_f64()
            ),
            MonitorEvent::Unresponsive {
                address,
                identifier,
                downtime,
            } => write!(
                f,
                "Device {} ({}) unresponsive for {:.1}s - sending notification",
                address,
                identifier,
                downtime.as_secs_f64()
            ),
            MonitorEvent::Recovered {
                address,
                identifier,
                ..
            } => write!(f, "Device {} ({}) is back online", address, identifier),
            MonitorEvent::NotificationSent {
                address,
                identifier,
            } => write!(f, "Notification sent for {} ({})", address, identifier),
            MonitorEvent::NotificationFailed {
                address,
                identifier,
                error,
            } => write!(
                f,
                "Failed to send notification for {} ({}): {}",
                address, identifier, error
            ),
            MonitorEvent::ProbeFailed { address, error } => {
                write!(f, "Error probing {}: {}", address, error)
            }
            MonitorEvent::DeviceFault { address, error } => {
                write!(f, "Error in monitoring loop for {}: {}", address, error)
            }
            MonitorEvent::Stopped => write!(f, "Monitoring stopped"),
        }
    }
}

/// A [`MonitorEvent`] stamped with the local time it happened at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    pub at: DateTime<Local>,
    pub event: MonitorEvent,
}

impl LogEvent {
    pub fn now(event: MonitorEvent) -> Self {
        Self {
            at: Local::now(),
            event,
        }
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format(TIME_FORMAT), self.event)
    }
}

/// Append-only destination for monitoring events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LogEvent);
}

/// Shared handle to a sink
pub type SharedSink = Arc<dyn EventSink>;

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: LogEvent) {
        match event.event.level() {
            EventLevel::Info => log::info!("{}", event.event),
            EventLevel::Warning => log::warn!("{}", event.event),
            EventLevel::Error => log::error!("{}", event.event),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: LogEvent) {}
}

/// One-way stream of events to a presentation layer.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<LogEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LogEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: LogEvent) {
        // Receiver gone means nobody is displaying events any more
        let _ = self.tx.send(event);
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().clone()
    }

    /// Count events matching a predicate
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&MonitorEvent) -> bool,
    {
        self.events.lock().iter().filter(|e| predicate(&e.event)).count()
    }

    pub fn lines(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.to_string()).collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: LogEvent) {
        self.events.lock().push(event);
    }
}

// Core business logic module

pub mod config;
pub mod monitor;
pub mod notify;
pub mod probe;

// Re-export commonly used items
pub use config::{Config, ProbeMethod};
pub use monitor::{Capabilities, Device, DeviceList, Monitor, MonitorEvent};
pub use notify::{AlertTemplate, EmailNotifier, LogNotifier, Notifier, WebhookNotifier};
pub use probe::{PingProber, Prober, TcpProber};

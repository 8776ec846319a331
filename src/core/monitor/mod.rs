//! Device monitoring engine.
//!
//! Tracks how long each device has been unreachable and raises exactly one
//! alert per outage once the downtime exceeds the configured threshold.

pub mod device;
pub mod evaluator;
pub mod events;
pub mod runtime;
pub mod settings;
pub mod state;

pub use device::{Device, DeviceList, UNKNOWN_IDENTIFIER};
pub use evaluator::{evaluate, Transition};
pub use events::{
    ChannelSink, EventLevel, EventSink, LogEvent, LogSink, MemorySink, MonitorEvent, NoopSink,
    SharedSink,
};
pub use runtime::{Capabilities, Monitor, MonitorLoop, Snapshot, STOP_GRACE};
pub use settings::{
    resolve, FileSettings, FixedSettings, PollSettings, RawSettings, RawValue, Resolved,
    SettingsSource, SharedSettings,
};
pub use state::{DeviceSnapshot, DeviceState, StateStore};

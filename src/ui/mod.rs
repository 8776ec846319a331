// UI and formatting module

pub mod formatters;
pub mod monitor_formatters;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_duration, format_secs, format_time};
pub use monitor_formatters::{print_event, print_snapshot, status_label};

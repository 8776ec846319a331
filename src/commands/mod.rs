// Command handlers module
pub mod check;
pub mod completions;
pub mod config;
pub mod version;
pub mod watch;

use anyhow::Result;
use clap::ArgMatches;
use std::path::PathBuf;

use crate::core::Config;

// Re-exports for cleaner imports
pub use check::execute as check;
pub use version::execute as version;
pub use watch::execute as watch;

/// Config file from the global `--config` flag, or the default location
pub fn config_path(matches: &ArgMatches) -> Result<PathBuf> {
    match matches.try_get_one::<String>("config").ok().flatten() {
        Some(path) => Ok(PathBuf::from(path)),
        None => Config::config_path(),
    }
}

//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod config;
mod logging;
mod version;

pub use commands::{SummaryArgs, WatchArgs, handle_summary_command, handle_watch_command};
pub use config::{ConfigSubcommand, handle_config_command};
pub use logging::*;
pub use version::display_version;

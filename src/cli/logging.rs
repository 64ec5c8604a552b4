//! Logging initialization

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialize logging
///
/// With `debug`, everything at debug level goes to a temporary log file
/// whose path is returned. Otherwise logs go to stderr at `level`.
/// `RUST_LOG` overrides the filter in both cases.
pub fn init_logging(debug: bool, level: &str) -> Option<PathBuf> {
    if debug {
        // Use Builder to create a named temp file that outlives this call
        let log_path = tempfile::Builder::new()
            .prefix("drlens-")
            .suffix(".log")
            .tempfile()
            .map(|f| {
                let path = f.path().to_path_buf();
                // Keep the file on disk; the OS cleans up its temp dir
                std::mem::forget(f);
                path
            })
            .unwrap_or_else(|_| std::env::temp_dir().join(format!("drlens-{}.log", std::process::id())));

        match std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&log_path)
        {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_writer(file)
                    .with_env_filter(env_filter("debug"))
                    .with_ansi(false) // No ANSI codes in log file
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .try_init();
                return Some(log_path);
            }
            Err(e) => {
                eprintln!(
                    "Failed to open log file {}: {}, logging to stderr",
                    log_path.display(),
                    e
                );
                init_stderr("debug");
                return None;
            }
        }
    }

    init_stderr(level);
    None
}

fn init_stderr(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(level))
        .with_target(false)
        .try_init();
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

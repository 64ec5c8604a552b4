//! drlens - cross-cluster disaster-recovery application view
//!
//! Reads DR and workload objects from an Open Cluster Management hub and
//! reports, per DR cluster, which applications are protected and where.

use anyhow::Result;
use clap::{Parser, Subcommand};

use drlens::cli::{
    ConfigSubcommand, SummaryArgs, WatchArgs, display_version, handle_config_command,
    handle_summary_command, handle_watch_command, init_logging,
};
use drlens::config::{Config, ConfigLoader};

/// drlens - cross-cluster disaster-recovery application view
#[derive(Parser, Debug)]
#[command(name = "drlens")]
#[command(about = "Cross-cluster disaster-recovery application view for OCM hubs", long_about = None)]
struct Args {
    /// Enable debug logging to a temporary file
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Print the per-cluster DR summary once
    Summary(SummaryArgs),
    /// Watch the hub and reprint the summary when it changes
    Watch(WatchArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Config { subcommand } => handle_config_command(subcommand),
        Command::Version => {
            display_version();
            Ok(())
        }
        Command::Summary(summary) => {
            let config = load_config(args.debug)?;
            handle_summary_command(summary, &config).await
        }
        Command::Watch(watch) => {
            let config = load_config(args.debug)?;
            handle_watch_command(watch, &config).await
        }
    }
}

/// Load configuration, then initialize logging at its level
fn load_config(debug: bool) -> Result<Config> {
    let config = ConfigLoader::load()?;

    let log_file = init_logging(debug, &config.logger.level);
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    tracing::debug!(
        "Configuration loaded: context={:?}, namespace={:?}, format={}",
        config.hub.context,
        config.hub.namespace,
        config.output.format
    );

    Ok(config)
}

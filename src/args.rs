use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Command-line configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory to open at startup
    #[arg(long)]
    pub root_dir: Option<PathBuf>,

    /// Serve the host message contract as JSON lines on stdin/stdout
    #[arg(long)]
    pub stdio: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,

    /// How long success notifications stay visible (milliseconds)
    #[arg(long, default_value = "3000")]
    pub notification_ms: u64,

    /// How long error notifications stay visible (milliseconds)
    #[arg(long, default_value = "5000")]
    pub error_notification_ms: u64,
}

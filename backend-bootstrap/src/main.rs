use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use backend_bootstrap::{init_tracing, LogFormat};

#[derive(Parser, Debug)]
#[command(name = "resource-tracker")]
#[command(about = "Guild resource tracker backend", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    /// Console log format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Also write daily rolling log files into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(config) = &args.config {
        std::env::set_var("TRACKER_CONFIG", config);
    }
    let _log_guard = init_tracing(args.log_format, args.log_dir.as_deref());

    backend_bootstrap::run().await
}

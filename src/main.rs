//! Golden harness CLI
//!
//! Runs sample programs and checks head/tail windows of their output
//! against checked-in golden transcripts.

use clap::Parser;
use golden::commands::Commands;
use golden::common::{config::Config, logging, paths};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "golden", about = "Golden-output regression harness")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: ./golden.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to the harness log file in the data directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });

    // Held so buffered file logs are flushed on exit
    let _guard = match cli.log_file.then(paths::ensure_log_dir) {
        Some(Ok(Some(dir))) => Some(logging::init_with_file(verbose, &dir)),
        Some(Err(e)) => {
            eprintln!("Warning: Could not create log directory: {}", e);
            logging::init_cli(verbose);
            None
        }
        _ => {
            logging::init_cli(verbose);
            None
        }
    };

    let result = match Config::load(cli.config.as_deref()) {
        Ok(config) => golden::cli::dispatch(cli.command, config).await,
        Err(e) => Err(e),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            2
        }
    };

    // process::exit skips destructors
    drop(_guard);
    std::process::exit(code);
}

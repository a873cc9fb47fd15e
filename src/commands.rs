//! CLI command definitions
//!
//! Defines the clap commands for the golden harness CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the scenarios of a suite file and compare against golden output
    Run {
        /// Path to the YAML suite file
        suite: PathBuf,

        /// Only run scenarios whose name contains this text
        #[arg(long, short)]
        filter: Option<String>,

        /// Kill sample programs after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Run each scenario in its own temporary working directory
        #[arg(long)]
        isolate: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,
    },

    /// List the scenarios of a suite file
    List {
        /// Path to the YAML suite file
        suite: PathBuf,
    },

    /// Re-run a scenario and overwrite its golden files with the output
    Regen {
        /// Path to the YAML suite file
        suite: PathBuf,

        /// Name of the scenario to regenerate
        #[arg(long, short)]
        scenario: String,
    },
}

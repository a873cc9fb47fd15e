//! CLI command dispatch
//!
//! Turns parsed commands into suite runs. Returns the process exit code.

use std::path::Path;
use std::time::Duration;

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::Result;
use crate::testing::{self, Reporter, RunOptions, Suite};

/// Dispatch a command, returning the exit code for the process
pub async fn dispatch(command: Commands, config: Config) -> Result<i32> {
    if !config.report.color {
        colored::control::set_override(false);
    }

    match command {
        Commands::Run {
            suite,
            filter,
            timeout,
            isolate,
            json,
            verbose,
        } => run(&suite, filter, timeout, isolate, json, verbose, config).await,
        Commands::List { suite } => list(&suite, &config),
        Commands::Regen { suite, scenario } => regen(&suite, &scenario, &config).await,
    }
}

async fn run(
    path: &Path,
    filter: Option<String>,
    timeout: Option<u64>,
    isolate: bool,
    json: bool,
    verbose: bool,
    config: Config,
) -> Result<i32> {
    let mut suite = Suite::load(path, &config)?;
    if isolate {
        suite.isolate = true;
    }
    if let Some(secs) = timeout {
        for scenario in &mut suite.scenarios {
            scenario.timeout = Some(Duration::from_secs(secs));
        }
    }

    let reporter = if json {
        Reporter::silent()
    } else {
        Reporter::new(verbose, config.report.max_diff_lines)
    };

    let options = RunOptions { filter };
    let report = testing::run_suite(&suite, &options, &reporter).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(if report.success() { 0 } else { 1 })
}

fn list(path: &Path, config: &Config) -> Result<i32> {
    let suite = Suite::load(path, config)?;
    println!("{} {}", "Suite:".blue().bold(), suite.name.white().bold());
    for scenario in &suite.scenarios {
        let windows: Vec<String> = scenario.windows.iter().map(|w| w.to_string()).collect();
        println!("  {} {}", scenario.name, windows.join(", ").dimmed());
    }
    Ok(0)
}

async fn regen(path: &Path, scenario: &str, config: &Config) -> Result<i32> {
    let suite = Suite::load(path, config)?;
    let written = testing::regenerate(&suite, scenario).await?;
    for file in written {
        println!("  {} {}", "✓".green(), file.display());
    }
    Ok(0)
}

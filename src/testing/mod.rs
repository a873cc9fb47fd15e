//! Scenario suite
//!
//! Reads YAML suite files, runs each scenario through the fixture stager,
//! the process runner and the golden comparator, and reports a pass/fail
//! outcome per scenario.

mod config;
mod report;
mod runner;

pub use config::*;
pub use report::Reporter;
pub use runner::{
    regenerate, run_scenario, run_suite, FailureKind, RunOptions, ScenarioResult, SuiteReport,
};

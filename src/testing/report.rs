//! Human-readable suite output

use colored::Colorize;

use crate::golden::CheckReport;

use super::config::{Scenario, Suite};
use super::runner::{FailureKind, ScenarioResult, SuiteReport};

/// Prints suite progress and results to stdout
#[derive(Debug, Clone)]
pub struct Reporter {
    enabled: bool,
    verbose: bool,
    max_diff_lines: usize,
}

impl Reporter {
    pub fn new(verbose: bool, max_diff_lines: usize) -> Self {
        Self {
            enabled: true,
            verbose,
            max_diff_lines,
        }
    }

    /// A reporter that prints nothing (JSON output, library use)
    pub fn silent() -> Self {
        Self {
            enabled: false,
            verbose: false,
            max_diff_lines: 0,
        }
    }

    pub fn suite_started(&self, suite: &Suite) {
        if !self.enabled {
            return;
        }
        println!(
            "\n{} {}",
            "Running Suite:".blue().bold(),
            suite.name.white().bold()
        );
        if let Some(desc) = &suite.description {
            println!("  {}", desc.dimmed());
        }
        if self.verbose {
            println!("  golden dir: {}", suite.golden.dir().display().to_string().dimmed());
            println!("  work dir:   {}", suite.work_dir.display().to_string().dimmed());
        }
    }

    pub fn scenario_started(&self, scenario: &Scenario) {
        if !self.enabled || !self.verbose {
            return;
        }
        println!("\n{} {}", "Scenario:".cyan(), scenario.name);
        if let Some(desc) = &scenario.description {
            println!("  {}", desc.dimmed());
        }
        for fixture in &scenario.fixtures {
            println!("  fixture {}", fixture.display().to_string().dimmed());
        }
    }

    pub fn scenario_finished(&self, result: &ScenarioResult) {
        if !self.enabled {
            return;
        }
        if result.passed {
            println!(
                "  {} {} {}",
                "✓".green(),
                result.name,
                format!("({} checks, {} ms)", result.checks.len(), result.duration_ms).dimmed()
            );
            return;
        }

        let kind = match result.failure {
            Some(FailureKind::Staging) => "staging failed",
            Some(FailureKind::Execution) => "execution failed",
            Some(FailureKind::Timeout) => "timed out",
            Some(FailureKind::Golden) => "golden file error",
            Some(FailureKind::Comparison) | None => "output mismatch",
        };
        println!("  {} {} {}", "✗".red(), result.name.bold(), kind.red());

        if let Some(error) = &result.error {
            for line in error.lines() {
                println!("      {}", line);
            }
        }
        for check in &result.checks {
            self.print_check(check);
        }
    }

    fn print_check(&self, check: &CheckReport) {
        if check.passed {
            if self.verbose {
                println!("    {} {}", "✓".green(), check.label().dimmed());
            }
            return;
        }

        println!("    {} {}", "✗".red(), check.label());
        if let Some(note) = &check.note {
            println!("      {}", note.yellow());
        }
        for diff in check.differences.iter().take(self.max_diff_lines) {
            println!("      line {}:", diff.golden_line);
            println!("        {} {}", "-".red(), diff.expected.red());
            println!("        {} {}", "+".green(), diff.actual.green());
        }
        let hidden = check.differences.len().saturating_sub(self.max_diff_lines);
        if hidden > 0 {
            println!("      {}", format!("... {} more differing lines", hidden).dimmed());
        }
    }

    pub fn summary(&self, report: &SuiteReport) {
        if !self.enabled {
            return;
        }
        let total = report.passed + report.failed;
        if report.success() {
            println!(
                "\n{} {}\n",
                "✓".green().bold(),
                format!("{} of {} scenarios passed", report.passed, total).green().bold()
            );
        } else {
            println!(
                "\n{} {}\n",
                "✗".red().bold(),
                format!("{} of {} scenarios failed", report.failed, total).red().bold()
            );
        }
    }
}

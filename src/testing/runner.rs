//! Suite runner implementation
//!
//! Executes scenarios one at a time: stage fixtures, run the sample program,
//! check every declared window, release the fixtures.

use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;

use crate::common::{Error, Result};
use crate::fixtures;
use crate::golden::{CapturedOutput, CheckReport};
use crate::process::ProcessRunner;

use super::config::{Scenario, Suite};
use super::report::Reporter;

/// Why a scenario failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Fixtures could not be staged; nothing was run
    Staging,
    /// The sample program could not start or exited non-zero
    Execution,
    /// The sample program exceeded its timeout
    Timeout,
    /// A golden file is missing or unreadable
    Golden,
    /// At least one window did not match
    Comparison,
}

/// Result of running one scenario
#[derive(Debug, Serialize)]
pub struct ScenarioResult {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    pub checks: Vec<CheckReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    #[serde(skip)]
    pub cause: Option<Error>,
}

impl ScenarioResult {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            failure: None,
            checks: Vec::new(),
            exit_code: None,
            error: None,
            duration_ms: 0,
            cause: None,
        }
    }

    fn fail(&mut self, kind: FailureKind, cause: Error) {
        self.passed = false;
        self.failure = Some(kind);
        self.exit_code = cause.exit_code();
        self.error = Some(cause.to_string());
        self.cause = Some(cause);
    }

    /// Checks that did not match
    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckReport> {
        self.checks.iter().filter(|c| !c.passed)
    }

    /// Convert into a `Result`, for callers that want `?` semantics
    pub fn into_result(mut self) -> Result<()> {
        if self.passed {
            return Ok(());
        }
        if let Some(cause) = self.cause.take() {
            return Err(cause);
        }
        let failures = self.failed_checks().map(CheckReport::label).collect();
        Err(Error::ComparisonMismatch {
            scenario: self.name,
            failures,
        })
    }
}

/// Results of a whole suite run
#[derive(Debug, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Options for a suite run
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    /// Only run scenarios whose name contains this
    pub filter: Option<String>,
}

/// Run the selected scenarios of a suite sequentially
pub async fn run_suite(suite: &Suite, options: &RunOptions, reporter: &Reporter) -> SuiteReport {
    reporter.suite_started(suite);

    let mut results = Vec::new();
    for scenario in suite.select(options.filter.as_deref()) {
        reporter.scenario_started(scenario);
        let result = run_scenario(suite, scenario).await;
        reporter.scenario_finished(&result);
        results.push(result);
    }

    let passed = results.iter().filter(|r| r.passed).count();
    let report = SuiteReport {
        suite: suite.name.clone(),
        passed,
        failed: results.len() - passed,
        results,
    };
    reporter.summary(&report);
    report
}

/// Run a single scenario
///
/// Never returns an error: every failure is recorded in the result.
pub async fn run_scenario(suite: &Suite, scenario: &Scenario) -> ScenarioResult {
    let started = Instant::now();
    let mut result = ScenarioResult::new(&scenario.name);

    match capture(suite, scenario).await {
        Ok(text) => compare(suite, scenario, &text, &mut result),
        Err((kind, cause)) => result.fail(kind, cause),
    }

    result.duration_ms = started.elapsed().as_millis() as u64;
    tracing::info!(
        scenario = %scenario.name,
        passed = result.passed,
        failure = ?result.failure,
        duration_ms = result.duration_ms,
        "scenario finished"
    );
    result
}

/// Stage fixtures and run the invocation; fixtures are gone when this returns
async fn capture(
    suite: &Suite,
    scenario: &Scenario,
) -> std::result::Result<String, (FailureKind, Error)> {
    // Held until the end of this function so isolated directories outlive the run
    let isolated = if suite.isolate {
        Some(tempfile::tempdir().map_err(|e| (FailureKind::Staging, Error::from(e)))?)
    } else {
        None
    };
    let work_dir: PathBuf = match &isolated {
        Some(dir) => dir.path().to_path_buf(),
        None => suite.work_dir.clone(),
    };

    let scope = fixtures::stage(&scenario.fixtures, &work_dir)
        .map_err(|e| (FailureKind::Staging, e))?;

    let runner = ProcessRunner::new(&suite.interpreter, scope.dir())
        .map_err(|e| (FailureKind::Execution, e))?
        .with_timeout(scenario.timeout);

    let text = runner.invoke(&scenario.invocation).await.map_err(|e| {
        let kind = match e {
            Error::Timeout { .. } => FailureKind::Timeout,
            _ => FailureKind::Execution,
        };
        (kind, e)
    })?;

    scope.release();
    Ok(text)
}

fn compare(suite: &Suite, scenario: &Scenario, text: &str, result: &mut ScenarioResult) {
    let output = CapturedOutput::from_text(text, scenario.final_segment);

    for window in &scenario.windows {
        match suite.golden.check(window, output.for_window(window)) {
            Ok(report) => result.checks.push(report),
            Err(e) => {
                result.fail(FailureKind::Golden, e);
                return;
            }
        }
    }

    result.passed = result.checks.iter().all(|c| c.passed);
    if !result.passed {
        result.failure = Some(FailureKind::Comparison);
    }
}

/// Run one scenario and overwrite its golden files with the captured output
pub async fn regenerate(suite: &Suite, name: &str) -> Result<Vec<PathBuf>> {
    let scenario = suite
        .scenario(name)
        .ok_or_else(|| Error::Config(format!("No scenario named '{}' in suite '{}'", name, suite.name)))?;

    let text = capture(suite, scenario).await.map_err(|(_, e)| e)?;

    let mut written = Vec::new();
    for golden in scenario.golden_names() {
        written.push(suite.golden.write(golden, &text)?);
    }
    Ok(written)
}

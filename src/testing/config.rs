//! Suite definition types
//!
//! Defines the YAML layout of a suite file and turns it into a validated
//! [`Suite`] with every path resolved and every window checked before a
//! single scenario runs.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::config::{Config, InterpreterConfig};
use crate::common::paths::resolve;
use crate::common::{Error, Result};
use crate::golden::{FinalSegment, GoldenStore, Side, Window, WindowSize};
use crate::process::Invocation;

/// A suite file as written on disk
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct SuiteConfig {
    /// Name of the suite
    pub name: String,
    /// Optional description of what the suite covers
    pub description: Option<String>,
    /// Directory holding golden transcripts, relative to the suite file
    #[serde(default = "default_dir")]
    pub golden_dir: PathBuf,
    /// Directory fixtures are staged into and programs run in
    #[serde(default = "default_dir")]
    pub work_dir: PathBuf,
    /// Interpreter override for this suite
    pub interpreter: Option<InterpreterConfig>,
    /// Timeout override for every scenario
    pub timeout_secs: Option<u64>,
    /// Run each scenario in its own temporary directory
    pub isolate: Option<bool>,
    /// The scenarios, run in declaration order
    pub scenarios: Vec<ScenarioConfig>,
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

/// One scenario as written on disk
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    pub name: String,
    pub description: Option<String>,
    /// Input files to stage, relative to the suite file
    #[serde(default)]
    pub fixtures: Vec<PathBuf>,
    pub run: RunConfig,
    /// Whether the segment after the final newline counts as a line
    #[serde(default)]
    pub final_segment: FinalSegment,
    pub timeout_secs: Option<u64>,
    pub checks: Vec<CheckConfig>,
}

/// How to invoke the sample program: exactly one of `script` or `inline`
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Script path, relative to the suite file
    pub script: Option<PathBuf>,
    /// Code passed to the interpreter's inline flag
    pub inline: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    /// Persist captured output here (inline only), relative to the work dir
    pub output_file: Option<PathBuf>,
}

/// Head and/or tail windows against one golden file
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    pub head: Option<WindowSize>,
    pub tail: Option<WindowSize>,
    pub golden: String,
}

/// A validated suite, ready to run
#[derive(Debug, Clone)]
pub struct Suite {
    pub name: String,
    pub description: Option<String>,
    pub golden: GoldenStore,
    pub work_dir: PathBuf,
    pub interpreter: InterpreterConfig,
    pub isolate: bool,
    pub scenarios: Vec<Scenario>,
}

/// A validated scenario
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub fixtures: Vec<PathBuf>,
    pub invocation: Invocation,
    pub final_segment: FinalSegment,
    pub timeout: Option<Duration>,
    pub windows: Vec<Window>,
}

impl Suite {
    /// Load and validate a suite file
    pub fn load(path: &Path, config: &Config) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read suite '{}': {}",
                path.display(),
                e
            ))
        })?;
        let raw: SuiteConfig = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse suite '{}': {}", path.display(), e)))?;

        let base = path
            .canonicalize()?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_config(raw, &base, config)
    }

    /// Validate a parsed suite, resolving relative paths against `base`
    pub fn from_config(raw: SuiteConfig, base: &Path, config: &Config) -> Result<Self> {
        if raw.scenarios.is_empty() {
            return Err(Error::Config(format!("Suite '{}' has no scenarios", raw.name)));
        }

        let suite_timeout = raw.timeout_secs.or(config.run.timeout_secs);
        let mut seen = HashSet::new();
        let mut scenarios = Vec::with_capacity(raw.scenarios.len());

        for scenario in raw.scenarios {
            if !seen.insert(scenario.name.clone()) {
                return Err(Error::Config(format!(
                    "Duplicate scenario name '{}'",
                    scenario.name
                )));
            }
            scenarios.push(Scenario::from_config(scenario, base, suite_timeout)?);
        }

        Ok(Self {
            name: raw.name,
            description: raw.description,
            golden: GoldenStore::new(resolve(base, &raw.golden_dir)),
            work_dir: resolve(base, &raw.work_dir),
            interpreter: raw.interpreter.unwrap_or_else(|| config.interpreter.clone()),
            isolate: raw.isolate.unwrap_or(config.run.isolate),
            scenarios,
        })
    }

    /// Scenarios whose name contains `filter`, in declaration order
    pub fn select<'a>(&'a self, filter: Option<&'a str>) -> impl Iterator<Item = &'a Scenario> {
        self.scenarios
            .iter()
            .filter(move |s| filter.map_or(true, |f| s.name.contains(f)))
    }

    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}

impl Scenario {
    fn from_config(raw: ScenarioConfig, base: &Path, suite_timeout: Option<u64>) -> Result<Self> {
        let context = |message: String| Error::Config(format!("Scenario '{}': {}", raw.name, message));

        if raw.name.trim().is_empty() {
            return Err(Error::Config("Scenario with an empty name".to_string()));
        }

        let invocation = match (&raw.run.script, &raw.run.inline) {
            (Some(script), None) => {
                if raw.run.output_file.is_some() {
                    return Err(context("'output_file' is only supported for inline runs".to_string()));
                }
                Invocation::Script {
                    path: resolve(base, script),
                    args: raw.run.args.clone(),
                }
            }
            (None, Some(code)) => Invocation::Inline {
                code: code.clone(),
                args: raw.run.args.clone(),
                output_file: raw.run.output_file.clone(),
            },
            _ => {
                return Err(context(
                    "'run' needs exactly one of 'script' or 'inline'".to_string(),
                ))
            }
        };

        if raw.checks.is_empty() {
            return Err(context("no checks declared".to_string()));
        }

        let mut windows = Vec::new();
        for check in &raw.checks {
            if check.head.is_none() && check.tail.is_none() {
                return Err(context(format!(
                    "check on '{}' needs 'head' and/or 'tail'",
                    check.golden
                )));
            }
            let sides = [(Side::Head, check.head), (Side::Tail, check.tail)];
            for (side, size) in sides {
                if let Some(size) = size {
                    let window = Window {
                        side,
                        size,
                        golden: check.golden.clone(),
                    };
                    window.validate().map_err(|e| match e {
                        Error::InvalidWindow(msg) => {
                            Error::InvalidWindow(format!("scenario '{}': {}", raw.name, msg))
                        }
                        other => other,
                    })?;
                    windows.push(window);
                }
            }
        }

        let mut fixtures = Vec::with_capacity(raw.fixtures.len());
        for fixture in &raw.fixtures {
            if fixture.file_name().is_none() {
                return Err(context(format!(
                    "fixture '{}' has no file name",
                    fixture.display()
                )));
            }
            fixtures.push(resolve(base, fixture));
        }

        Ok(Self {
            timeout: raw.timeout_secs.or(suite_timeout).map(Duration::from_secs),
            name: raw.name,
            description: raw.description,
            fixtures,
            invocation,
            final_segment: raw.final_segment,
            windows,
        })
    }

    /// Distinct golden file names this scenario compares against
    pub fn golden_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for window in &self.windows {
            if !names.contains(&window.golden.as_str()) {
                names.push(&window.golden);
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUITE: &str = r#"
name: doc-samples
golden_dir: samples
scenarios:
  - name: tutorial-1
    fixtures: [testcases/data/orcl-2000.csv]
    run:
      script: samples/tutorial-1.py
    checks:
      - head: 3
        golden: tutorial-1.output
      - tail: 3
        golden: tutorial-1.output
  - name: mtgox
    fixtures: [samples/data/trades-mtgox-usd-2013-03.csv]
    run:
      inline: |
        import sys
        sys.path.append('samples')
        import tutorial_mtgox_1
        tutorial_mtgox_1.main(False)
    final_segment: keep
    timeout_secs: 30
    checks:
      - { head: 10, tail: 10, golden: tutorial_mtgox_1.output }
  - name: technical-1
    run: { script: samples/technical-1.py }
    checks:
      - { head: all, golden: technical-1.output }
"#;

    fn parse(yaml: &str) -> Result<Suite> {
        let raw: SuiteConfig = serde_yaml::from_str(yaml)?;
        Suite::from_config(raw, Path::new("/repo"), &Config::default())
    }

    #[test]
    fn test_parse_suite() {
        let suite = parse(SUITE).unwrap();
        assert_eq!(suite.name, "doc-samples");
        assert_eq!(suite.golden.dir(), Path::new("/repo/samples"));
        assert_eq!(suite.work_dir, Path::new("/repo/."));
        assert_eq!(suite.interpreter.command, "python");
        assert_eq!(suite.scenarios.len(), 3);

        let tutorial = &suite.scenarios[0];
        assert_eq!(
            tutorial.fixtures,
            vec![PathBuf::from("/repo/testcases/data/orcl-2000.csv")]
        );
        assert_eq!(
            tutorial.invocation,
            Invocation::Script {
                path: PathBuf::from("/repo/samples/tutorial-1.py"),
                args: Vec::new(),
            }
        );
        assert_eq!(
            tutorial.windows,
            vec![
                Window::head(3, "tutorial-1.output"),
                Window::tail(3, "tutorial-1.output")
            ]
        );
        assert_eq!(tutorial.final_segment, FinalSegment::Drop);
        assert_eq!(tutorial.timeout, None);

        let mtgox = &suite.scenarios[1];
        assert!(matches!(mtgox.invocation, Invocation::Inline { .. }));
        assert_eq!(mtgox.final_segment, FinalSegment::Keep);
        assert_eq!(mtgox.timeout, Some(Duration::from_secs(30)));
        assert_eq!(mtgox.windows.len(), 2);
        assert_eq!(mtgox.golden_names(), vec!["tutorial_mtgox_1.output"]);

        assert_eq!(suite.scenarios[2].windows[0].size, WindowSize::All);
    }

    #[test]
    fn test_zero_window_fails_at_load() {
        let yaml = r#"
name: s
scenarios:
  - name: bad
    run: { script: a.py }
    checks:
      - { head: 0, golden: a.output }
"#;
        let err = parse(yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow(ref m) if m.contains("bad")));
    }

    #[test]
    fn test_run_needs_exactly_one_form() {
        let both = r#"
name: s
scenarios:
  - name: both
    run: { script: a.py, inline: "print(1)" }
    checks: [{ head: 1, golden: a.output }]
"#;
        assert!(matches!(parse(both), Err(Error::Config(_))));

        let neither = r#"
name: s
scenarios:
  - name: neither
    run: { args: ["x"] }
    checks: [{ head: 1, golden: a.output }]
"#;
        assert!(matches!(parse(neither), Err(Error::Config(_))));
    }

    #[test]
    fn test_check_needs_a_side() {
        let yaml = r#"
name: s
scenarios:
  - name: sideless
    run: { script: a.py }
    checks: [{ golden: a.output }]
"#;
        assert!(matches!(parse(yaml), Err(Error::Config(_))));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let yaml = r#"
name: s
scenarios:
  - name: same
    run: { script: a.py }
    checks: [{ head: 1, golden: a.output }]
  - name: same
    run: { script: b.py }
    checks: [{ head: 1, golden: b.output }]
"#;
        assert!(matches!(parse(yaml), Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
name: s
scenarios:
  - name: typo
    run: { script: a.py }
    chekcs: [{ head: 1, golden: a.output }]
"#;
        assert!(serde_yaml::from_str::<SuiteConfig>(yaml).is_err());
    }

    #[test]
    fn test_suite_overrides_config() {
        let yaml = r#"
name: s
interpreter: { command: python3, args: [] }
timeout_secs: 5
isolate: true
scenarios:
  - name: one
    run: { script: a.py }
    checks: [{ tail: 2, golden: a.output }]
"#;
        let suite = parse(yaml).unwrap();
        assert_eq!(suite.interpreter.command, "python3");
        assert!(suite.interpreter.args.is_empty());
        assert_eq!(suite.interpreter.inline_flag, "-c");
        assert!(suite.isolate);
        assert_eq!(suite.scenarios[0].timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_select_by_substring() {
        let suite = parse(SUITE).unwrap();
        let names: Vec<&str> = suite.select(Some("tu")).map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["tutorial-1"]);
        assert_eq!(suite.select(None).count(), 3);
        assert!(suite.scenario("mtgox").is_some());
    }
}

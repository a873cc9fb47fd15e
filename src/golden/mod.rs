//! Golden transcript comparison
//!
//! Golden files are checked-in reference transcripts. A comparison checks a
//! head or tail window of captured output against the same window of the
//! transcript, line for line and with exact string equality. Only the
//! trimming applied by [`read_lines`] to the golden side is tolerated.

mod lines;
mod window;

pub use lines::{read_lines, CapturedOutput, FinalSegment};
pub use window::{ensure_window, slice, Side, Window, WindowSize};

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::common::Result;

/// One position where the expected and actual windows differ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiff {
    /// 1-based line number within the golden transcript
    pub golden_line: usize,
    pub expected: String,
    pub actual: String,
}

/// Outcome of checking one window
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub side: Side,
    pub lines: usize,
    pub golden: String,
    pub passed: bool,
    /// Why the window could not be compared at all (too short)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub differences: Vec<LineDiff>,
}

impl CheckReport {
    /// Short description used in summaries, e.g. `head 3 of 'a.output'`
    pub fn label(&self) -> String {
        format!("{} {} of '{}'", self.side, self.lines, self.golden)
    }
}

/// Directory of golden transcripts
#[derive(Debug, Clone)]
pub struct GoldenStore {
    dir: PathBuf,
}

impl GoldenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Load a golden transcript by file name
    pub fn load(&self, name: &str) -> Result<Vec<String>> {
        read_lines(&self.path_of(name))
    }

    /// Whether the first `n` lines of `actual` equal the first `n` golden lines
    ///
    /// Either sequence being shorter than `n` is a mismatch, not an error.
    pub fn compare_head<S: AsRef<str>>(&self, name: &str, actual: &[S], n: usize) -> Result<bool> {
        self.compare(name, actual, Side::Head, n)
    }

    /// Whether the last `n` lines of `actual` equal the last `n` golden lines
    pub fn compare_tail<S: AsRef<str>>(&self, name: &str, actual: &[S], n: usize) -> Result<bool> {
        self.compare(name, actual, Side::Tail, n)
    }

    fn compare<S: AsRef<str>>(&self, name: &str, actual: &[S], side: Side, n: usize) -> Result<bool> {
        ensure_window(n)?;
        let golden = self.load(name)?;
        let matched = match (slice(&golden, side, n), slice(actual, side, n)) {
            (Some(expected), Some(got)) => windows_equal(expected, got),
            _ => false,
        };
        tracing::debug!(golden = name, %side, n, matched, "compared window");
        Ok(matched)
    }

    /// Check a window and describe any mismatch
    pub fn check<S: AsRef<str>>(&self, window: &Window, actual: &[S]) -> Result<CheckReport> {
        window.validate()?;
        let golden = self.load(&window.golden)?;
        let n = window.resolve(actual.len());

        let mut report = CheckReport {
            side: window.side,
            lines: n,
            golden: window.golden.clone(),
            passed: false,
            note: None,
            differences: Vec::new(),
        };

        if n == 0 {
            report.note = Some("captured output is empty".to_string());
            return Ok(report);
        }

        let (expected, got) = match (slice(&golden, window.side, n), slice(actual, window.side, n)) {
            (Some(expected), Some(got)) => (expected, got),
            (None, _) => {
                report.note = Some(format!(
                    "golden file has {} lines, window needs {}",
                    golden.len(),
                    n
                ));
                return Ok(report);
            }
            (_, None) => {
                report.note = Some(format!(
                    "captured output has {} lines, window needs {}",
                    actual.len(),
                    n
                ));
                return Ok(report);
            }
        };

        let offset = match window.side {
            Side::Head => 0,
            Side::Tail => golden.len() - n,
        };
        for (i, (e, a)) in expected.iter().zip(got).enumerate() {
            let a: &str = a.as_ref();
            if e != a {
                report.differences.push(LineDiff {
                    golden_line: offset + i + 1,
                    expected: e.clone(),
                    actual: a.to_string(),
                });
            }
        }
        report.passed = report.differences.is_empty();

        tracing::debug!(
            window = %window,
            passed = report.passed,
            differing = report.differences.len(),
            "checked window"
        );
        Ok(report)
    }

    /// Overwrite a golden transcript with captured text, verbatim
    pub fn write(&self, name: &str, text: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_of(name);
        std::fs::write(&path, text)?;
        tracing::info!(path = %path.display(), "regenerated golden file");
        Ok(path)
    }
}

fn windows_equal<S: AsRef<str>>(expected: &[String], actual: &[S]) -> bool {
    expected.len() == actual.len()
        && expected.iter().zip(actual).all(|(e, a)| {
            let a: &str = a.as_ref();
            e == a
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    const TRANSCRIPT: &str = "2000-01-03 open 118.12\n\
                              2000-01-04 open 107.69\n\
                              2000-01-05 open 102.00\n\
                              2000-01-06 open 96.00\n\
                              Final portfolio value: $1082.01\n";

    fn store_with(name: &str, content: &str) -> (tempfile::TempDir, GoldenStore) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(name), content).unwrap();
        let store = GoldenStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_transcript_matches_itself() {
        let (_dir, store) = store_with("t.output", TRANSCRIPT);
        let golden = store.load("t.output").unwrap();
        for n in 1..=golden.len() {
            assert!(store.compare_head("t.output", &golden, n).unwrap());
            assert!(store.compare_tail("t.output", &golden, n).unwrap());
        }
    }

    #[test]
    fn test_short_capture_is_false_not_error() {
        let (_dir, store) = store_with("t.output", TRANSCRIPT);
        let actual = ["2000-01-03 open 118.12"];
        assert!(!store.compare_head("t.output", &actual, 3).unwrap());
        assert!(!store.compare_tail("t.output", &actual, 3).unwrap());
    }

    #[test]
    fn test_short_golden_is_false() {
        let (_dir, store) = store_with("t.output", "only\n");
        let actual = ["a", "b", "only"];
        assert!(!store.compare_tail("t.output", &actual, 2).unwrap());
    }

    #[test]
    fn test_zero_window_is_usage_error() {
        let (_dir, store) = store_with("t.output", TRANSCRIPT);
        let actual = ["x"];
        assert!(matches!(
            store.compare_head("t.output", &actual, 0),
            Err(Error::InvalidWindow(_))
        ));
        assert!(matches!(
            store.compare_tail("t.output", &actual, 0),
            Err(Error::InvalidWindow(_))
        ));
    }

    #[test]
    fn test_missing_golden_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = GoldenStore::new(dir.path());
        let actual = ["x"];
        assert!(matches!(
            store.compare_head("absent.output", &actual, 1),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_tail_ignores_noisy_middle() {
        let (_dir, store) = store_with("t.output", TRANSCRIPT);
        let actual = [
            "2000-01-03 open 118.12",
            "progress 10%",
            "progress 90%",
            "2000-01-06 open 96.00",
            "Final portfolio value: $1082.01",
        ];
        assert!(store.compare_head("t.output", &actual, 1).unwrap());
        assert!(store.compare_tail("t.output", &actual, 2).unwrap());
        assert!(!store.compare_tail("t.output", &actual, 3).unwrap());
    }

    #[test]
    fn test_no_numeric_tolerance() {
        let (_dir, store) = store_with("t.output", TRANSCRIPT);
        let actual = ["2000-01-03 open 118.120"];
        assert!(!store.compare_head("t.output", &actual, 1).unwrap());
    }

    #[test]
    fn test_check_reports_differences_with_golden_line_numbers() {
        let (_dir, store) = store_with("t.output", TRANSCRIPT);
        let actual = [
            "2000-01-03 open 118.12",
            "2000-01-04 open 107.69",
            "2000-01-05 open 102.01",
            "2000-01-06 open 96.00",
            "Final portfolio value: $1082.02",
        ];

        let head = store.check(&Window::head(2, "t.output"), &actual).unwrap();
        assert!(head.passed);

        let tail = store.check(&Window::tail(3, "t.output"), &actual).unwrap();
        assert!(!tail.passed);
        assert_eq!(tail.differences.len(), 2);
        assert_eq!(tail.differences[0].golden_line, 3);
        assert_eq!(tail.differences[0].expected, "2000-01-05 open 102.00");
        assert_eq!(tail.differences[0].actual, "2000-01-05 open 102.01");
        assert_eq!(tail.differences[1].golden_line, 5);
    }

    #[test]
    fn test_check_all_window() {
        let (_dir, store) = store_with("t.output", TRANSCRIPT);
        let golden = store.load("t.output").unwrap();
        let window = Window {
            side: Side::Head,
            size: WindowSize::All,
            golden: "t.output".to_string(),
        };
        let prefix: Vec<&str> = golden.iter().take(3).map(String::as_str).collect();
        assert!(store.check(&window, &prefix).unwrap().passed);

        let empty: [&str; 0] = [];
        let report = store.check(&window, &empty).unwrap();
        assert!(!report.passed);
        assert!(report.note.is_some());
    }

    #[test]
    fn test_check_short_capture_note() {
        let (_dir, store) = store_with("t.output", TRANSCRIPT);
        let report = store
            .check(&Window::head(10, "t.output"), &["x", "y"])
            .unwrap();
        assert!(!report.passed);
        assert_eq!(
            report.note.as_deref(),
            Some("golden file has 5 lines, window needs 10")
        );
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = GoldenStore::new(dir.path().join("samples"));
        store.write("new.output", "a\n  b\n").unwrap();
        assert_eq!(store.load("new.output").unwrap(), vec!["a", "b"]);
    }
}

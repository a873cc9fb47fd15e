//! Line reading for golden transcripts and captured output

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

use super::window::{Side, Window, WindowSize};
use crate::common::{Error, Result};

/// Read a text file as whitespace-trimmed lines
///
/// Order is preserved and blank lines stay as empty strings. A trailing
/// newline does not produce an extra empty line. Every call re-reads the
/// file.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::not_found(path)),
        Err(e) => return Err(e.into()),
    };
    Ok(content.lines().map(|line| line.trim().to_string()).collect())
}

/// What to do with the segment after the last `\n` of captured output
///
/// Output ending in a newline splits into a final empty segment. Dropping it
/// makes "last N lines" mean the last N printed lines. Only tail and `all`
/// windows see the segment dropped; head windows read the raw split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalSegment {
    /// Discard the final split segment, whatever it contains
    #[default]
    Drop,
    /// Count the final split segment as a line
    Keep,
}

/// Standard output of one invocation, split into lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    segments: Vec<String>,
    final_segment: FinalSegment,
}

impl CapturedOutput {
    /// Split normalized text on `\n`. Lines are not trimmed.
    pub fn from_text(text: &str, final_segment: FinalSegment) -> Self {
        Self {
            segments: text.split('\n').map(str::to_string).collect(),
            final_segment,
        }
    }

    /// Lines after applying the final segment policy
    pub fn lines(&self) -> &[String] {
        match self.final_segment {
            FinalSegment::Drop => &self.segments[..self.segments.len().saturating_sub(1)],
            FinalSegment::Keep => &self.segments,
        }
    }

    /// Lines a window is compared against
    pub fn for_window(&self, window: &Window) -> &[String] {
        match (window.side, window.size) {
            (Side::Head, WindowSize::Lines(_)) => &self.segments,
            _ => self.lines(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_lines_trims_and_keeps_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.output");
        std::fs::write(&path, "  first  \n\nthird\t\r\nlast\n").unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines, vec!["first", "", "third", "last"]);
    }

    #[test]
    fn test_read_lines_without_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.output");
        std::fs::write(&path, "a\nb").unwrap();
        assert_eq!(read_lines(&path).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_read_lines_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.output");
        std::fs::write(&path, "").unwrap();
        assert!(read_lines(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_lines_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_lines(&dir.path().join("missing.output")).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_captured_output_drop_final_segment() {
        let out = CapturedOutput::from_text("a\nb\nc\n", FinalSegment::Drop);
        assert_eq!(out.lines(), ["a", "b", "c"]);

        // Dropped even when the output lacks a trailing newline
        let out = CapturedOutput::from_text("a\nb", FinalSegment::Drop);
        assert_eq!(out.lines(), ["a"]);
    }

    #[test]
    fn test_captured_output_keep_final_segment() {
        let out = CapturedOutput::from_text("a\nb\n", FinalSegment::Keep);
        assert_eq!(out.lines(), ["a", "b", ""]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_captured_output_is_not_trimmed() {
        let out = CapturedOutput::from_text("  padded \n", FinalSegment::Drop);
        assert_eq!(out.lines(), ["  padded "]);
    }

    #[test]
    fn test_empty_capture() {
        assert!(CapturedOutput::from_text("", FinalSegment::Drop).is_empty());
        assert_eq!(CapturedOutput::from_text("", FinalSegment::Keep).lines(), [""]);
    }

    #[test]
    fn test_head_window_reads_unterminated_last_line() {
        let out = CapturedOutput::from_text("a\nb\nc", FinalSegment::Drop);
        assert_eq!(out.for_window(&Window::head(3, "x.output")), ["a", "b", "c"]);
        assert_eq!(out.for_window(&Window::tail(2, "x.output")), ["a", "b"]);

        let all = Window {
            side: Side::Head,
            size: WindowSize::All,
            golden: "x.output".to_string(),
        };
        assert_eq!(out.for_window(&all), ["a", "b"]);
    }
}

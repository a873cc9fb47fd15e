//! Comparison windows

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::{Error, Result};

/// Which end of the sequences a window anchors to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Head,
    Tail,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Head => write!(f, "head"),
            Side::Tail => write!(f, "tail"),
        }
    }
}

/// Number of lines a window covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSize", into = "RawSize")]
pub enum WindowSize {
    Lines(usize),
    /// Every captured line; resolved once the output is known
    All,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawSize {
    Count(usize),
    Word(String),
}

impl TryFrom<RawSize> for WindowSize {
    type Error = String;

    fn try_from(raw: RawSize) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawSize::Count(n) => Ok(WindowSize::Lines(n)),
            RawSize::Word(word) if word == "all" => Ok(WindowSize::All),
            RawSize::Word(word) => Err(format!(
                "window size must be a positive line count or 'all', got '{}'",
                word
            )),
        }
    }
}

impl From<WindowSize> for RawSize {
    fn from(size: WindowSize) -> Self {
        match size {
            WindowSize::Lines(n) => RawSize::Count(n),
            WindowSize::All => RawSize::Word("all".to_string()),
        }
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowSize::Lines(n) => write!(f, "{}", n),
            WindowSize::All => write!(f, "all"),
        }
    }
}

/// One head or tail check against a named golden transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub side: Side,
    pub size: WindowSize,
    pub golden: String,
}

impl Window {
    pub fn head(lines: usize, golden: impl Into<String>) -> Self {
        Self {
            side: Side::Head,
            size: WindowSize::Lines(lines),
            golden: golden.into(),
        }
    }

    pub fn tail(lines: usize, golden: impl Into<String>) -> Self {
        Self {
            side: Side::Tail,
            size: WindowSize::Lines(lines),
            golden: golden.into(),
        }
    }

    /// Reject windows that would always pass
    pub fn validate(&self) -> Result<()> {
        if self.size == WindowSize::Lines(0) {
            return Err(Error::invalid_window(format!(
                "{} window on '{}' has zero lines",
                self.side, self.golden
            )));
        }
        if self.golden.trim().is_empty() {
            return Err(Error::invalid_window(format!(
                "{} window has no golden file name",
                self.side
            )));
        }
        Ok(())
    }

    /// Concrete window length for a capture of `captured` lines
    pub fn resolve(&self, captured: usize) -> usize {
        match self.size {
            WindowSize::Lines(n) => n,
            WindowSize::All => captured,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} of '{}'", self.side, self.size, self.golden)
    }
}

/// Require a non-empty window length
pub fn ensure_window(n: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::invalid_window("window length must be at least 1"));
    }
    Ok(())
}

/// The slice a window covers, or `None` when the sequence is too short
pub fn slice<S>(seq: &[S], side: Side, n: usize) -> Option<&[S]> {
    match side {
        Side::Head => seq.get(..n),
        Side::Tail => seq.len().checked_sub(n).map(|start| &seq[start..]),
    }
}

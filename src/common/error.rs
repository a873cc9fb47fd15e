//! Error types for the golden harness
//!
//! Each variant maps to one failure mode an operator has to tell apart:
//! a missing file, a staging problem, a crashed sample program, a hung
//! sample program, a malformed suite, or an output mismatch.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === File Errors ===
    #[error("File not found: '{}'", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to stage '{}' as '{}': {reason}", .source_path.display(), .destination.display())]
    Copy {
        source_path: PathBuf,
        destination: PathBuf,
        reason: String,
    },

    #[error("Fixture destination '{}' is already held by an open staging scope", .destination.display())]
    FixtureInUse { destination: PathBuf },

    // === Execution Errors ===
    #[error("Command '{command}' exited with {}{}", exit_label(.exit_code), stderr_label(.stderr))]
    Execution {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Command '{command}' timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("Failed to start '{command}': {reason}")]
    Spawn { command: String, reason: String },

    #[error("Interpreter '{name}' not found on PATH")]
    InterpreterNotFound { name: String },

    // === Suite Definition Errors ===
    #[error("Invalid comparison window: {0}")]
    InvalidWindow(String),

    #[error("Scenario '{scenario}' failed: {}", .failures.join("; "))]
    ComparisonMismatch {
        scenario: String,
        failures: Vec<String>,
    },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn stderr_label(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!("\n--- stderr ---\n{}", stderr.trim_end())
    }
}

impl Error {
    /// Create a not found error for a path
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a copy error for a staging failure
    pub fn copy(
        source_path: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Copy {
            source_path: source_path.into(),
            destination: destination.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid window error
    pub fn invalid_window(message: impl Into<String>) -> Self {
        Self::InvalidWindow(message.into())
    }

    /// Exit code of the failed subprocess, if this is an execution error
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Execution { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_mentions_exit_code_and_stderr() {
        let err = Error::Execution {
            command: "python -u broken.py".to_string(),
            exit_code: Some(1),
            stderr: "Traceback: boom\n".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("Traceback: boom"));
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn test_execution_error_without_code() {
        let err = Error::Execution {
            command: "sh".to_string(),
            exit_code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
        assert!(!err.to_string().contains("stderr"));
    }

    #[test]
    fn test_timeout_message() {
        let err = Error::Timeout {
            command: "python -u hang.py".to_string(),
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(
            err.to_string(),
            "Command 'python -u hang.py' timed out after 1.5s"
        );
    }

    #[test]
    fn test_not_found_names_path() {
        let err = Error::not_found("samples/tutorial-1.output");
        assert_eq!(
            err.to_string(),
            "File not found: 'samples/tutorial-1.output'"
        );
    }
}

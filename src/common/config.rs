//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::{config_path, LOCAL_CONFIG_FILE};
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Interpreter used to run sample programs
    #[serde(default)]
    pub interpreter: InterpreterConfig,

    /// Scenario execution settings
    #[serde(default)]
    pub run: RunSettings,

    /// Report rendering settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// How sample programs are invoked
///
/// Scripts run as `<command> <args...> <script> <script args...>`, inline
/// code as `<command> <args...> <inline_flag> <code> <extra args...>`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    #[serde(default = "default_command")]
    pub command: String,

    #[serde(default = "default_interpreter_args")]
    pub args: Vec<String>,

    #[serde(default = "default_inline_flag")]
    pub inline_flag: String,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_interpreter_args(),
            inline_flag: default_inline_flag(),
        }
    }
}

fn default_command() -> String {
    "python".to_string()
}

// Unbuffered, so interleaved output is captured in program order
fn default_interpreter_args() -> Vec<String> {
    vec!["-u".to_string()]
}

fn default_inline_flag() -> String {
    "-c".to_string()
}

/// Scenario execution settings
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Kill a sample program after this many seconds. Unset waits forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Give every scenario a fresh temporary working directory
    #[serde(default)]
    pub isolate: bool,
}

/// Report rendering settings
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    #[serde(default = "default_color")]
    pub color: bool,

    /// Maximum number of differing lines printed per failed window
    #[serde(default = "default_max_diff_lines")]
    pub max_diff_lines: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            max_diff_lines: default_max_diff_lines(),
        }
    }
}

fn default_color() -> bool {
    true
}

fn default_max_diff_lines() -> usize {
    20
}

impl Config {
    /// Load configuration
    ///
    /// Looks at `explicit` first (which must exist), then `./golden.toml`,
    /// then the user configuration file. Returns defaults if none exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::not_found(path));
            }
            return Self::from_file(path);
        }

        let candidates: Vec<PathBuf> = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
            .chain(config_path())
            .collect();

        for path in candidates {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}

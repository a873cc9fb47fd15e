//! Configuration, log and path-resolution helpers

use std::io;
use std::path::{Path, PathBuf};

/// Name used for the platform configuration and data directories
const APP_NAME: &str = "golden-harness";

/// File name of a project-local configuration file
pub const LOCAL_CONFIG_FILE: &str = "golden.toml";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/golden-harness/`
/// - macOS: `~/Library/Application Support/golden-harness/`
/// - Windows: `%APPDATA%\golden-harness\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the user configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the log directory
pub fn log_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().join("logs"))
}

/// Ensure the log directory exists
pub fn ensure_log_dir() -> io::Result<Option<PathBuf>> {
    if let Some(dir) = log_dir() {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(Some(dir))
    } else {
        Ok(None)
    }
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_is_valid() {
        let dir = config_dir();
        assert!(dir.is_some());
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let base = Path::new("/suites");
        assert_eq!(
            resolve(base, Path::new("data/orcl-2000.csv")),
            PathBuf::from("/suites/data/orcl-2000.csv")
        );
        assert_eq!(
            resolve(base, Path::new("/abs/file.csv")),
            PathBuf::from("/abs/file.csv")
        );
    }
}
